//! Error types for `QueryPilot` core library.

use thiserror::Error;

/// Result type alias using `QueryPilot` Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for `QueryPilot` operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Unrecognised database type string
    #[error("Unknown database type: {0}")]
    UnknownDatabaseKind(String),

    /// Unrecognised role string
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Client-visible failure taxonomy for API operations.
///
/// Every failed call against the server collapses into one of these
/// categories. `Authentication` is the only variant with a side effect:
/// the caller must clear its session exactly once and never retry the
/// failed operation.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Credentials missing, invalid, or expired (HTTP 401).
    #[error("Authentication required: {0}")]
    Authentication(String),

    /// The caller is authenticated but not allowed (HTTP 403).
    /// Terminal for the operation; never retried or escalated.
    #[error("Access denied: {0}")]
    Authorization(String),

    /// A local precondition failed, or the server rejected the
    /// input (HTTP 400/404).
    #[error("Invalid request: {0}")]
    Validation(String),

    /// The operation was accepted but failed server-side, with the
    /// server-reported reason.
    #[error("{0}")]
    Execution(String),

    /// The server could not be reached at all.
    #[error("Request failed: {0}")]
    Transport(String),
}

impl ApiError {
    /// Whether this failure must force a session clear.
    pub const fn expires_session(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn only_authentication_expires_the_session() {
        assert!(ApiError::Authentication("token expired".into()).expires_session());
        assert!(!ApiError::Authorization("no grant".into()).expires_session());
        assert!(!ApiError::Validation("empty question".into()).expires_session());
        assert!(!ApiError::Execution("syntax error".into()).expires_session());
        assert!(!ApiError::Transport("connection refused".into()).expires_session());
    }

    #[test]
    fn messages_carry_the_reason() {
        let err = ApiError::Authorization("no access to connection 3".into());
        assert_eq!(err.to_string(), "Access denied: no access to connection 3");

        let err = ApiError::Execution("table does not exist".into());
        assert_eq!(err.to_string(), "table does not exist");
    }
}
