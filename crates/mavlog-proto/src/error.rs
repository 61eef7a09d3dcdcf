//! MAVLink decoding errors

use thiserror::Error;

/// Errors that can occur while decoding a frame header
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtoError {
    /// Buffer has no bytes at all
    #[error("empty frame")]
    Empty,

    /// First byte is not a MAVLink start marker
    #[error("unknown start marker: 0x{0:02X}")]
    UnknownMagic(u8),

    /// Buffer shorter than the header its start marker announces
    #[error("truncated header: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
}

/// Result type for decoding operations
pub type ProtoResult<T> = Result<T, ProtoError>;
