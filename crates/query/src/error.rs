//! Query error types

use loghub_store::StoreError;

/// Errors that can occur during query execution
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// Window start after window end
    #[error("invalid range: since {since} is after until {until}")]
    InvalidRange { since: i64, until: i64 },

    /// Bounds computation or scan failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl QueryError {
    /// True when the caller supplied bad parameters
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRange { .. }
                | Self::Store(
                    StoreError::IdentityTooLong { .. }
                        | StoreError::InvalidIdentity(_)
                        | StoreError::InvalidTimestamp(_)
                )
        )
    }
}

/// Result type for query operations
pub type Result<T> = std::result::Result<T, QueryError>;
