//! Common error types for log endpoints

use thiserror::Error;

/// Result type for endpoint operations
pub type EndpointResult<T> = Result<T, EndpointError>;

/// Errors that can occur in log endpoints
#[derive(Debug, Error)]
pub enum EndpointError {
    /// Filesystem error while writing a log
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Endpoint was stopped and no longer accepts packets
    #[error("Endpoint stopped: {0}")]
    Stopped(String),
}

impl EndpointError {
    /// Whether the endpoint can keep accepting packets after this error
    pub fn is_fatal(&self) -> bool {
        matches!(self, EndpointError::Stopped(_))
    }
}
