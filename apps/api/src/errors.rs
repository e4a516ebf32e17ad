use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::backend_client::BackendError;
use crate::interview::InterviewError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Interview error: {0}")]
    Interview(#[from] InterviewError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Interview(e) => interview_status(e),
            AppError::Backend(e) => {
                tracing::error!("Backend error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "BACKEND_ERROR",
                    "The recruitment backend could not be reached".to_string(),
                )
            }
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

fn interview_status(e: &InterviewError) -> (StatusCode, &'static str, String) {
    match e {
        InterviewError::InvalidInterviewState(_) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "INVALID_INTERVIEW_STATE",
            e.to_string(),
        ),
        InterviewError::EmptyAnswer => (
            StatusCode::BAD_REQUEST,
            "EMPTY_ANSWER",
            "Please provide an answer before continuing".to_string(),
        ),
        InterviewError::EvaluationFailed(cause) => {
            tracing::error!("Evaluation error: {cause}");
            (
                StatusCode::BAD_GATEWAY,
                "EVALUATION_FAILED",
                "Failed to submit answer. Please try again.".to_string(),
            )
        }
        InterviewError::SessionNotFound => (
            StatusCode::NOT_FOUND,
            "SESSION_NOT_FOUND",
            e.to_string(),
        ),
        InterviewError::SessionBusy => (StatusCode::CONFLICT, "SESSION_BUSY", e.to_string()),
        InterviewError::SessionCancelled => {
            (StatusCode::GONE, "SESSION_CANCELLED", e.to_string())
        }
    }
}
