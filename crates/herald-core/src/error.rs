//! Error types shared by transport implementations.

use thiserror::Error;

/// Errors that can occur while delivering messages or sending replies.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The underlying connection is gone.
    #[error("connection closed: {reason}")]
    ConnectionClosed {
        /// Reason for closure.
        reason: String,
    },

    /// A reply could not be sent.
    #[error("failed to send reply: {0}")]
    SendFailed(String),

    /// The source was started twice or after shutdown.
    #[error("message source '{name}' is not available")]
    NotAvailable {
        /// The source name.
        name: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;
