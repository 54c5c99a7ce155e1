use std::fmt;
use thiserror::Error;

/// Body the server sends when a database being created already exists.
pub const DATABASE_EXISTS_BODY: &str = "database already exists\n";

/// Body the server sends when a frame being created already exists.
pub const FRAME_EXISTS_BODY: &str = "frame already exists\n";

/// Server-side resource named by an already-exists error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Database,
    Frame,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Database => f.write_str("database"),
            Resource::Frame => f.write_str("frame"),
        }
    }
}

/// Coarse classification of a [`PilosaError`].
///
/// Callers deciding on retry policy should match on the kind rather than on
/// individual variants: timeouts and cancellations are transport failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    EmptyCluster,
    Transport,
    Server,
    AlreadyExists,
    Decode,
    Validation,
    Query,
}

#[derive(Error, Debug)]
pub enum PilosaError {
    #[error("No hosts available in the cluster")]
    EmptyCluster,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Server error ({status}) {status_text}: {body}")]
    Server {
        status: u16,
        status_text: String,
        body: String,
    },

    #[error("{0} already exists")]
    AlreadyExists(Resource),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Query error: {0}")]
    Query(String),
}

impl PilosaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PilosaError::EmptyCluster => ErrorKind::EmptyCluster,
            PilosaError::Transport(_) | PilosaError::Timeout(_) | PilosaError::Cancelled => {
                ErrorKind::Transport
            }
            PilosaError::Server { .. } => ErrorKind::Server,
            PilosaError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            PilosaError::Decode(_) => ErrorKind::Decode,
            PilosaError::Validation(_) => ErrorKind::Validation,
            PilosaError::Query(_) => ErrorKind::Query,
        }
    }

    /// True when the request never produced an HTTP response.
    pub fn is_transport(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }

    /// True when the server reported that `resource` already exists.
    pub fn is_already_exists(&self, resource: Resource) -> bool {
        matches!(self, PilosaError::AlreadyExists(r) if *r == resource)
    }
}

impl From<prost::DecodeError> for PilosaError {
    fn from(err: prost::DecodeError) -> Self {
        PilosaError::Decode(err.to_string())
    }
}

/// Maps a non-2xx response to an error.
///
/// The server reports duplicate resources only through the body text, so the
/// two literals below are matched byte for byte, trailing newline included.
/// Anything else becomes [`PilosaError::Server`].
pub fn classify_server_error(status: u16, status_text: &str, body: &str) -> PilosaError {
    match body {
        DATABASE_EXISTS_BODY => PilosaError::AlreadyExists(Resource::Database),
        FRAME_EXISTS_BODY => PilosaError::AlreadyExists(Resource::Frame),
        _ => PilosaError::Server {
            status,
            status_text: status_text.to_string(),
            body: body.to_string(),
        },
    }
}

pub type Result<T> = std::result::Result<T, PilosaError>;
