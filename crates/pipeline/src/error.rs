//! Pipeline error types

use loghub_protocol::ProtocolError;
use loghub_store::StoreError;
use thiserror::Error;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Event text matches no accepted line format
    #[error("invalid event line: {0}")]
    InvalidLine(String),

    /// Payload is not valid hex
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// Frame failed to decode
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Sequence allocation or key encoding failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Pipeline no longer admits events
    #[error("pipeline is closed")]
    Closed,
}

impl PipelineError {
    /// Create an InvalidLine error
    pub fn invalid_line(line: impl Into<String>) -> Self {
        Self::InvalidLine(line.into())
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PipelineError::invalid_line("garbage");
        assert_eq!(err.to_string(), "invalid event line: garbage");

        let err = PipelineError::from(ProtocolError::EmptyMessage);
        assert!(err.to_string().contains("empty message"));

        let err = PipelineError::from(StoreError::Closed);
        assert!(err.to_string().contains("engine closed"));

        assert_eq!(PipelineError::Closed.to_string(), "pipeline is closed");
    }
}
