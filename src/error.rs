//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

use crate::model::InferenceError;
use crate::models::ValidationError;
use crate::sink::SinkError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors
    #[error("validation failed: {0}")]
    Validation(ValidationError),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    // Model errors
    #[error("model not loaded")]
    ModelUnavailable,

    #[error("inference error: {0}")]
    Inference(String),

    // Storage errors
    #[error("storage error: {0}")]
    Storage(String),

    // Generic errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Validation(err) => {
                tracing::debug!("Rejected payload: {}", err);
                let status = StatusCode::UNPROCESSABLE_ENTITY;
                let body = Json(json!({
                    "error": "Validation failed",
                    "status": status.as_u16(),
                    "detail": err.issues,
                }));
                return (status, body).into_response();
            }
            AppError::InvalidQuery(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.as_str()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::ModelUnavailable => (StatusCode::SERVICE_UNAVAILABLE, "Model not loaded"),
            AppError::Inference(msg) => {
                tracing::error!("Inference error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Inference failed")
            }
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Storage error occurred")
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<InferenceError> for AppError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::Unavailable => AppError::ModelUnavailable,
            other => AppError::Inference(other.to_string()),
        }
    }
}

impl From<SinkError> for AppError {
    fn from(err: SinkError) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidQuery(err.to_string())
    }
}
