use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::extract::ExtractError;
use crate::forms::FormRejection;
use crate::llm_client::LlmError;
use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error")]
    Validation(FormRejection),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The provider failed. The record created before the call, if any, is kept.
    #[error("Generation failed: {source}")]
    Generation {
        record_id: Option<Uuid>,
        #[source]
        source: LlmError,
    },

    /// Malformed or oversized upload body; keeps axum's own status.
    #[error("Upload rejected: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        AppError::Validation(rejection)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { kind, id } => AppError::NotFound(format!("{kind} {id} not found")),
            StoreError::Database(e) => AppError::Database(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(rejection) => {
                let body = Json(json!({
                    "error": {
                        "code": "VALIDATION_ERROR",
                        "message": "One or more fields are invalid",
                        "fields": rejection.fields,
                        "values": rejection.values,
                    }
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Generation { record_id, source } => {
                tracing::error!("Generation failed for record {record_id:?}: {source}");
                let (status, code) = match source {
                    LlmError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "GENERATION_TIMEOUT"),
                    _ => (StatusCode::BAD_GATEWAY, "GENERATION_FAILED"),
                };
                let body = Json(json!({
                    "error": {
                        "code": code,
                        "message": format!("{source}. Please try again."),
                        "record_id": record_id,
                    }
                }));
                return (status, body).into_response();
            }
            AppError::Multipart(e) => {
                let status = e.status();
                tracing::warn!("Rejected upload ({status}): {}", e.body_text());
                let code = if status == StatusCode::PAYLOAD_TOO_LARGE {
                    "PAYLOAD_TOO_LARGE"
                } else {
                    "INVALID_UPLOAD"
                };
                (status, code, e.body_text())
            }
            AppError::Extraction(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EXTRACTION_FAILED",
                e.to_string(),
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
