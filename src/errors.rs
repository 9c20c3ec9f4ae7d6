use crate::services::file_service::FileServiceError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// A lightweight wrapper for handler errors that keeps the message local.
///
/// The message is what the client sees, so store failures never carry the
/// underlying cause here; it is logged instead.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Shortcut for 400 Bad Request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    /// Map a service failure onto the HTTP contract.
    ///
    /// Validation failures keep their own message and become 400s. Anything
    /// else is logged and reported as a 500 with the operation's fixed
    /// `failure` message.
    pub fn from_service(err: FileServiceError, failure: &'static str) -> Self {
        match err {
            FileServiceError::Validation(msg) => Self::bad_request(msg),
            other => {
                tracing::error!(error = %other, "{}", failure);
                Self::internal(failure)
            }
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.message }));

        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::object_store::StoreError;

    #[test]
    fn validation_errors_become_bad_requests() {
        let err = AppError::from_service(
            FileServiceError::Validation("No files to delete"),
            "Failed to delete files",
        );
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "No files to delete");
    }

    #[test]
    fn store_errors_hide_the_cause() {
        let err = AppError::from_service(
            StoreError::Network("connection reset by peer".into()).into(),
            "Failed to copy file",
        );
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Failed to copy file");
    }

    #[test]
    fn invalid_source_keys_are_server_errors() {
        let err = AppError::from_service(
            FileServiceError::InvalidSourceKey("docs/".into()),
            "Failed to copy file",
        );
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
