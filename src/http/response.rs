//! Error responses.
//!
//! Failures are rendered as `{"error": {"code": ..., "message": ...}}` with a
//! stable `code` for programmatic handling.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::ConfigError;

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResult {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorResult,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: ErrorResult,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            error: ErrorResult {
                code: code.to_string(),
                message: message.into(),
            },
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        let status = match &err {
            ConfigError::StorageWriteFailed { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ConfigError::SchemaViolation { .. } | ConfigError::DuplicateRoot { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::BAD_REQUEST,
        };
        Self::new(status, err.code(), err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.error })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageError;

    #[test]
    fn test_status_mapping() {
        let e: ApiError = ConfigError::RootNotFound { root: "x".into() }.into();
        assert_eq!(e.status, StatusCode::BAD_REQUEST);
        assert_eq!(e.error.code, "CONFIG_PATH_UNRECOGNIZED");

        let e: ApiError = ConfigError::ValidationFailure {
            path: "baseline.autoAdjust.timeout".into(),
            message: "disabled".into(),
        }
        .into();
        assert_eq!(e.status, StatusCode::BAD_REQUEST);
        assert_eq!(e.error.code, "CONFIG_VALIDATION_FAILED");
        assert!(e.error.message.contains("disabled"));

        let e: ApiError = ConfigError::StorageWriteFailed {
            root: "rest".into(),
            source: StorageError::Unavailable("disk full".into()),
        }
        .into();
        assert_eq!(e.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(e.error.code, "CONFIG_STORAGE_FAILED");
    }
}
