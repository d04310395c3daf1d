use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::document::DocumentError;
use crate::render::RenderError;
use crate::sync::SyncError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("Not saved: {0}")]
    Sync(#[from] SyncError),

    #[error("Export failed: {0}")]
    Render(#[from] RenderError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, retryable) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
            }
            AppError::Document(e) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string(), None)
            }
            AppError::Sync(e @ SyncError::Subscribe(_)) => {
                tracing::warn!("Remote subscription failed: {e}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "REMOTE_UNAVAILABLE",
                    format!("Remote document store is unavailable: {e}"),
                    Some(true),
                )
            }
            AppError::Sync(e) if e.is_retryable() => {
                tracing::warn!("Save failed: {e}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "NOT_SAVED_RETRY",
                    format!("Changes were not saved: {e}"),
                    Some(true),
                )
            }
            AppError::Sync(e) => {
                tracing::error!("Save failed permanently: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "NOT_SAVED",
                    format!("Changes were not saved: {e}"),
                    Some(false),
                )
            }
            AppError::Render(e) => {
                tracing::error!("Export error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EXPORT_ERROR",
                    "The document could not be exported".to_string(),
                    None,
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(retryable) = retryable {
            error["retryable"] = json!(retryable);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
