pub mod compare;

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use coverdiff_core::{FailureKind, PipelineError};

use crate::models::ErrorResponse;

/// Everything a handler can fail with, mapped to a generic client message.
pub enum ApiError {
    Upload(MultipartError),
    Pipeline(PipelineError),
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        ApiError::Pipeline(e)
    }
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Upload(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                (StatusCode::PAYLOAD_TOO_LARGE, "Upload too large.")
            }
            ApiError::Upload(_) => (StatusCode::BAD_REQUEST, "Failed to read upload."),
            ApiError::Pipeline(PipelineError::MissingInput(_)) => {
                (StatusCode::BAD_REQUEST, "Missing file(s).")
            }
            ApiError::Pipeline(e) if e.kind() == FailureKind::BadInput => {
                (StatusCode::BAD_REQUEST, "Failed to read PDF.")
            }
            ApiError::Pipeline(e) if e.is_timeout() => {
                (StatusCode::GATEWAY_TIMEOUT, "Failed to compare documents.")
            }
            ApiError::Pipeline(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to compare documents.",
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        match &self {
            ApiError::Upload(e) => tracing::warn!(error = %e, "rejected upload"),
            ApiError::Pipeline(e) if status.is_client_error() => {
                tracing::warn!(error = %e, "rejected comparison input")
            }
            ApiError::Pipeline(e) => tracing::error!(error = %e, "comparison failed"),
        }
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
