use std::time::Duration;

/// Client configuration.
///
/// # Default Configuration
///
/// - `request_timeout`: 30 seconds
/// - `max_response_size`: 100 MB
///
/// # Example
///
/// ```rust
/// use pilosa_client::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .with_request_timeout(Duration::from_secs(5))
///     .with_max_response_size(1024 * 1024);
/// assert_eq!(config.request_timeout, Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Upper bound on one request, connect through last body byte
    pub request_timeout: Duration,
    /// Responses with larger bodies fail with a transport error
    pub max_response_size: usize,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_max_response_size(mut self, max_response_size: usize) -> Self {
        self.max_response_size = max_response_size;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            max_response_size: 100 * 1024 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.max_response_size, 100 * 1024 * 1024);
    }

    #[test]
    fn test_config_builders() {
        let config = ClientConfig::new()
            .with_request_timeout(Duration::from_millis(250))
            .with_max_response_size(10);
        assert_eq!(config.request_timeout, Duration::from_millis(250));
        assert_eq!(config.max_response_size, 10);
    }
}
