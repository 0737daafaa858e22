//! HTTP error type
//!
//! Every handler failure becomes an [`ApiError`]. Store failures are decoded
//! exactly once, in `From<StoreError>`. The two 409 bodies (person conflict,
//! blocked delete) carry structured payloads and live with their workflows.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mlr_common::api::types::InvalidFields;
use mlr_common::db::gateway::SignalKind;
use mlr_common::StoreError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Client-facing description for failures whose detail stays in the log
const INTERNAL_DESCRIPTION: &str = "An internal error occurred; see server logs";

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or invalid input (400)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Store constraint violation not otherwise classified (400)
    #[error("Integrity violation: {0}")]
    Integrity(String),

    /// Store call exceeded its time budget (504)
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Unexpected failure (500); the detail is logged, never returned
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Integrity(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Integrity(_) => "INTEGRITY_VIOLATION",
            ApiError::Timeout(_) => "TIMEOUT",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Integrity(detail) => ApiError::Integrity(detail),
            StoreError::Signal { code, message } => {
                let message = format!("[{code}] {message}");
                match code.kind() {
                    SignalKind::NotFound => ApiError::NotFound(message),
                    SignalKind::Invalid => ApiError::Validation(message),
                }
            }
            err @ (StoreError::Timeout { .. } | StoreError::Busy(_)) => {
                ApiError::Timeout(err.to_string())
            }
            err @ StoreError::Database(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<InvalidFields> for ApiError {
    fn from(err: InvalidFields) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Internal(format!("JSON encoding failed: {err}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let description = match self {
            ApiError::Internal(detail) => {
                error!(error = %detail, "Request failed");
                INTERNAL_DESCRIPTION.to_string()
            }
            ApiError::Timeout(detail) => {
                warn!(error = %detail, "Store call timed out");
                "The database did not respond in time".to_string()
            }
            ApiError::Validation(msg)
            | ApiError::NotFound(msg)
            | ApiError::Integrity(msg) => msg,
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": description,
            },
            "description": description,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlr_common::StoreCode;

    #[test]
    fn test_signals_map_by_kind() {
        let not_found = ApiError::from(StoreError::signal(StoreCode::EmployeeNotFound, "gone"));
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.to_string(), "Resource not found: [50011] gone");

        let ambiguous = ApiError::from(StoreError::signal(StoreCode::SongTitleAmbiguous, "two"));
        assert_eq!(ambiguous.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_store_failures_map_to_status() {
        let integrity = ApiError::from(StoreError::Integrity("UNIQUE constraint failed".into()));
        assert_eq!(integrity.status(), StatusCode::BAD_REQUEST);

        let timeout = ApiError::from(StoreError::Timeout {
            procedure: "sp_GetSongs",
            millis: 5000,
        });
        assert_eq!(timeout.status(), StatusCode::GATEWAY_TIMEOUT);

        let busy = ApiError::from(StoreError::Busy("database is locked".into()));
        assert_eq!(busy.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_invalid_fields_become_validation() {
        let err = ApiError::from(InvalidFields(vec!["Name", "Roles"]));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("Name, Roles"));
    }
}
