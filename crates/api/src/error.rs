//! API error types
//!
//! Provides structured error responses for the HTTP API.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use loghub_query::QueryError;
use serde::Serialize;
use thiserror::Error;

/// API errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Required query parameter absent or empty
    #[error("missing parameter: {0}")]
    MissingParameter(&'static str),

    /// Query parameter present but unusable
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter { name: &'static str, message: String },

    /// Invalid time range
    #[error("invalid time range: {0}")]
    InvalidTimeRange(String),

    /// Query execution failed
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingParameter(_) => StatusCode::BAD_REQUEST,
            Self::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
            Self::InvalidTimeRange(_) => StatusCode::BAD_REQUEST,
            Self::QueryFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingParameter(_) => "MISSING_PARAMETER",
            Self::InvalidParameter { .. } => "INVALID_PARAMETER",
            Self::InvalidTimeRange(_) => "INVALID_TIME_RANGE",
            Self::QueryFailed(_) => "QUERY_FAILED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    // Helper constructors

    /// Create an invalid parameter error
    pub fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::InvalidRange { .. } => Self::InvalidTimeRange(err.to_string()),
            _ if err.is_client_error() => Self::invalid("simNo", err.to_string()),
            _ => Self::QueryFailed(err.to_string()),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code (machine-readable)
    pub error: &'static str,
    /// Error message (human-readable)
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.code(),
            message: self.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(
                error_code = body.error,
                error_message = %body.message,
                status = %status,
                "API error"
            );
        } else {
            tracing::warn!(
                error_code = body.error,
                error_message = %body.message,
                status = %status,
                "API error"
            );
        }

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type Result<T> = std::result::Result<T, ApiError>;
