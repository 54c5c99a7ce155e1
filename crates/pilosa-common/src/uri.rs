//! Server addresses.
//!
//! An address has the form `[scheme://][host][:port]`; whatever is omitted
//! falls back to `http`, `localhost` and `10101`. The scheme may name a
//! codec after a `+` (`http+protobuf`); only the part before the `+` is used
//! when building request URLs.

use std::fmt;
use std::str::FromStr;

use crate::protocol::error::{PilosaError, Result};

pub const DEFAULT_SCHEME: &str = "http";
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 10101;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Uri {
    scheme: String,
    host: String,
    port: u16,
}

impl Uri {
    /// Parses an address, filling in defaults for omitted parts.
    ///
    /// # Example
    ///
    /// ```
    /// use pilosa_common::Uri;
    ///
    /// let uri = Uri::from_address("index1.pilosa.com:20202").unwrap();
    /// assert_eq!(uri.normalized_address(), "http://index1.pilosa.com:20202");
    /// ```
    pub fn from_address(address: &str) -> Result<Self> {
        let (scheme, rest) = match address.split_once("://") {
            Some((scheme, rest)) => {
                validate_scheme(scheme, address)?;
                (scheme, rest)
            }
            None => (DEFAULT_SCHEME, address),
        };

        let (host, port) = match rest.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (rest, None),
        };

        let host = if host.is_empty() { DEFAULT_HOST } else { host };
        validate_host(host, address)?;

        let port = match port {
            Some(port) => port
                .parse::<u16>()
                .map_err(|_| invalid_address(address))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            scheme: scheme.to_string(),
            host: host.to_ascii_lowercase(),
            port,
        })
    }

    pub fn from_host_port(host: &str, port: u16) -> Result<Self> {
        validate_host(host, host)?;
        Ok(Self {
            scheme: DEFAULT_SCHEME.to_string(),
            host: host.to_ascii_lowercase(),
            port,
        })
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// `transport://host:port`, the prefix every request URL is built from.
    pub fn normalized_address(&self) -> String {
        let transport = self
            .scheme
            .split_once('+')
            .map_or(self.scheme.as_str(), |(transport, _)| transport);
        format!("{}://{}:{}", transport, self.host, self.port)
    }
}

impl Default for Uri {
    fn default() -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
    }
}

impl FromStr for Uri {
    type Err = PilosaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_address(s)
    }
}

fn validate_scheme(scheme: &str, address: &str) -> Result<()> {
    let valid = !scheme.is_empty()
        && !scheme.starts_with('+')
        && !scheme.ends_with('+')
        && scheme.bytes().all(|b| b.is_ascii_lowercase() || b == b'+');
    if valid {
        Ok(())
    } else {
        Err(invalid_address(address))
    }
}

fn validate_host(host: &str, address: &str) -> Result<()> {
    let valid = !host.is_empty()
        && host
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'-');
    if valid {
        Ok(())
    } else {
        Err(invalid_address(address))
    }
}

fn invalid_address(address: &str) -> PilosaError {
    PilosaError::Validation(format!("invalid address: '{}'", address))
}
