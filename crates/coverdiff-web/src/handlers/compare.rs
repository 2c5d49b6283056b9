use std::sync::Arc;

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Response};
use coverdiff_core::{ComparisonResult, DocumentPair};

use super::ApiError;
use crate::models::AlignedResponse;
use crate::state::AppState;
use crate::upload;

/// `POST /pdfData`: the comparison result as a two-element array.
pub async fn compare(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    match run(&state, multipart).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => e.into_response(),
    }
}

/// `POST /pdfData/aligned`: the same comparison, already aligned by category.
pub async fn compare_aligned(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    match run(&state, multipart).await {
        Ok(result) => Json(AlignedResponse::from(&result)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn run(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<ComparisonResult, ApiError> {
    // A request that is not multipart carries no files at all.
    let fields = match multipart {
        Ok(multipart) => upload::parse_multipart(multipart)
            .await
            .map_err(ApiError::Upload)?,
        Err(rejection) => {
            tracing::debug!(%rejection, "request body is not multipart");
            upload::FormFields::default()
        }
    };

    let (left, right) = fields.into_buffers();
    let docs = DocumentPair::from_parts(left, right)?;

    let result =
        coverdiff_core::compare_documents(Arc::clone(&state.backend), state.service.as_ref(), docs)
            .await?;
    Ok(result)
}
