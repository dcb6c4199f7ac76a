//! Error types for packetwire.

use std::io;

use thiserror::Error;

/// Main error type for all buffer operations.
#[derive(Debug, Error)]
pub enum BufferError {
    /// The transport reached end-of-stream before the requested bytes arrived.
    #[error("unexpected end of stream")]
    UnexpectedEof,

    /// A checkout was attempted while unread bytes are still buffered.
    #[error("busy buffer: unread data pending")]
    BusyBuffer,

    /// I/O error from the transport, including read deadline expiry.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl BufferError {
    /// Whether this error is an expired read deadline.
    ///
    /// Std sockets report timeouts as `WouldBlock` on Unix and `TimedOut`
    /// on Windows, so both count.
    pub fn is_timeout(&self) -> bool {
        match self {
            BufferError::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
            ),
            _ => false,
        }
    }
}

/// Result type alias using BufferError.
pub type Result<T> = std::result::Result<T, BufferError>;
