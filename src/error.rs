//! Service-wide error taxonomy.
//!
//! # Design Decisions
//! - Handlers and services return `ApiError`; the HTTP boundary renders it
//! - Body shape is `{"error": {"message": ..., "status": ...}}`
//! - Upstream detail is logged where it happens, not echoed to clients

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced to API clients.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Malformed input or a generic upstream failure.
    #[error("{0}")]
    BadRequest(String),

    /// Bad credentials, bad signup code, or a missing/invalid token.
    #[error("{0}")]
    Unauthorized(String),

    /// The requested resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Client exceeded its request allowance.
    #[error("Too many requests, please try again later.")]
    TooManyRequests,

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = json!({
            "error": {
                "message": self.to_string(),
                "status": status.as_u16(),
            }
        });
        (status, Json(body)).into_response()
    }
}

/// Result type for request handling.
pub type ApiResult<T> = Result<T, ApiError>;
