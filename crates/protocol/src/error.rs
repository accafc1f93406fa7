//! Protocol error types
//!
//! Hard failures while decoding or encoding a frame. Soft anomalies
//! (checksum, length drift) are [`crate::Warning`]s instead.

use thiserror::Error;

/// Errors that can occur during protocol operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Frame is not delimited by markers
    #[error("malformed frame: {0}")]
    MalformedFrame(&'static str),

    /// Frame has nothing between its markers
    #[error("empty message")]
    EmptyMessage,

    /// A fixed-width header field runs past the end of the frame
    #[error("truncated header: {field} needs {needed} bytes, {available} available")]
    TruncatedHeader {
        field: &'static str,
        needed: usize,
        available: usize,
    },

    /// A body field runs past the end of the body
    #[error("truncated body: {field} needs {needed} bytes, {available} available")]
    TruncatedBody {
        field: &'static str,
        needed: usize,
        available: usize,
    },

    /// Body does not fit the 10-bit length field
    #[error("body too long: {size} bytes exceeds maximum {max}")]
    BodyTooLong { size: usize, max: usize },

    /// Device identity does not fit the version-appropriate width
    #[error("device identity too long: {digits} digits exceeds {max}")]
    IdentityTooLong { digits: usize, max: usize },

    /// Device identity is not a hex string
    #[error("invalid device identity '{0}'")]
    InvalidIdentity(String),
}

impl ProtocolError {
    /// Create a malformed frame error
    #[inline]
    pub fn malformed(reason: &'static str) -> Self {
        Self::MalformedFrame(reason)
    }

    /// Create an identity too long error
    #[inline]
    pub fn identity_too_long(digits: usize, width_bytes: usize) -> Self {
        Self::IdentityTooLong {
            digits,
            max: width_bytes * 2,
        }
    }

    /// Create an invalid identity error
    #[inline]
    pub fn invalid_identity(identity: impl Into<String>) -> Self {
        Self::InvalidIdentity(identity.into())
    }

    /// Check if this error marks a frame that should be skipped silently
    pub fn is_skippable(&self) -> bool {
        matches!(self, Self::EmptyMessage)
    }
}
