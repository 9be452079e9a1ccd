use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::error::CatalogError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CatalogError`] for store and ingestion failures and adds
/// HTTP-specific variants. Renders as `{ "error": ..., "code": ... }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("background task failed: {err}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Catalog(err) => match err {
                CatalogError::NotFound { .. } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    "Drama not found".to_string(),
                ),
                CatalogError::SourceNotFound(_) => {
                    (StatusCode::NOT_FOUND, "SOURCE_NOT_FOUND", err.to_string())
                }
                CatalogError::Ingestion(msg) => {
                    tracing::error!(error = %msg, "Ingestion failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INGESTION_FAILED",
                        format!("Conversion failed: {msg}"),
                    )
                }
                CatalogError::Database(_) | CatalogError::Io(_) => {
                    tracing::error!(error = %err, "Store access failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "DATABASE_ERROR",
                        err.to_string(),
                    )
                }
            },
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
