//! Handler error type and its HTTP mapping.
//!
//! Every failing endpoint answers with the same JSON envelope
//! ([`ErrorBody`]), so clients can classify failures by status code alone.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use querypilot_core::db::{DatabaseError, unix_timestamp};
use querypilot_core::wire::ErrorBody;

use crate::engine::EngineError;

/// Errors surfaced by request handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, malformed, or expired credentials (401).
    #[error("{0}")]
    Unauthenticated(String),

    /// Authenticated but not allowed (403).
    #[error("{0}")]
    Forbidden(String),

    /// Referenced entity does not exist (404).
    #[error("{0}")]
    NotFound(String),

    /// The request itself is invalid (400).
    #[error("{0}")]
    BadRequest(String),

    /// The query engine failed or answered with an error (502).
    #[error("{0}")]
    Engine(String),

    /// Anything we cannot blame on the caller (500).
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Engine(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(e: DatabaseError) -> Self {
        match e {
            DatabaseError::NotFound(what) => Self::NotFound(format!("{what} not found")),
            other => {
                error!(error = %other, "Storage operation failed");
                Self::Internal("Internal server error".into())
            }
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        Self::Engine(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), message = %self, "Request failed");
        }
        let body = ErrorBody {
            error: true,
            message: self.to_string(),
            timestamp: unix_timestamp(),
        };
        (status, Json(body)).into_response()
    }
}
