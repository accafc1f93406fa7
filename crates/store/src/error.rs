//! Store error types

use loghub_protocol::ProtocolError;
use thiserror::Error;

/// Errors from key encoding and storage engines
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("device identity too long: {digits} digits exceeds {max}")]
    IdentityTooLong { digits: usize, max: usize },

    #[error("invalid device identity '{0}'")]
    InvalidIdentity(String),

    /// Timestamp outside the unsigned epoch-seconds range
    #[error("invalid timestamp {0}")]
    InvalidTimestamp(i64),

    /// Stored value could not be decoded
    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("engine closed")]
    Closed,
}

impl StoreError {
    /// Create an invalid value error
    pub fn invalid_value(msg: impl Into<String>) -> Self {
        Self::InvalidValue(msg.into())
    }
}

impl From<ProtocolError> for StoreError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::IdentityTooLong { digits, max } => Self::IdentityTooLong { digits, max },
            ProtocolError::InvalidIdentity(id) => Self::InvalidIdentity(id),
            other => Self::InvalidIdentity(other.to_string()),
        }
    }
}
