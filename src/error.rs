//! Error types for framelink
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using LinkError
pub type Result<T> = std::result::Result<T, LinkError>;

/// Unified error type for framelink operations
#[derive(Debug, Error)]
pub enum LinkError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Cannot connect to {addr}: {source}")]
    Connection {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Framing Errors
    // -------------------------------------------------------------------------
    #[error("Incomplete frame: stream closed after {received} bytes without sentinel")]
    IncompleteFrame { received: usize },

    #[error("Unsafe payload: sentinel byte at offset {position}")]
    UnsafePayload { position: usize },

    #[error("Frame too large: exceeds {limit} bytes")]
    FrameTooLarge { limit: usize },

    // -------------------------------------------------------------------------
    // Command Errors
    // -------------------------------------------------------------------------
    #[error("Unknown command: {0:?}")]
    UnknownCommand(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LinkError {
    /// True for errors produced while parsing operator input
    pub fn is_parse_error(&self) -> bool {
        matches!(self, LinkError::UnknownCommand(_) | LinkError::InvalidArgument(_))
    }

    /// True when an I/O error is a read/write timeout
    ///
    /// Unix reports socket timeouts as `WouldBlock`, Windows as `TimedOut`.
    pub fn is_timeout(&self) -> bool {
        match self {
            LinkError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }
}
