//! One comparison job: two extractions, one service call, strict validation.
//!
//! Both extractions run concurrently on the blocking pool and are joined
//! before the single request is sent. Nothing is shared between jobs except
//! the read-only backend and service handles.

use std::sync::Arc;

use crate::backend::{BackendError, PdfBackend, check_pdf_magic};
use crate::error::{PipelineError, Side};
use crate::service::{TextService, UpstreamError};
use crate::{ComparisonResult, prompt, validate};

/// The two document buffers of one job, in left/right order.
#[derive(Debug, Clone)]
pub struct DocumentPair {
    pub left: Vec<u8>,
    pub right: Vec<u8>,
}

impl DocumentPair {
    pub fn new(left: Vec<u8>, right: Vec<u8>) -> Self {
        Self { left, right }
    }

    /// Build a pair from possibly-missing buffers, failing before any work
    /// is done if either is absent.
    pub fn from_parts(
        left: Option<Vec<u8>>,
        right: Option<Vec<u8>>,
    ) -> Result<Self, PipelineError> {
        let left = left.ok_or(PipelineError::MissingInput(Side::Left))?;
        let right = right.ok_or(PipelineError::MissingInput(Side::Right))?;
        Ok(Self { left, right })
    }
}

/// Run the whole pipeline for one pair of documents.
pub async fn compare_documents(
    backend: Arc<dyn PdfBackend>,
    service: &dyn TextService,
    docs: DocumentPair,
) -> Result<ComparisonResult, PipelineError> {
    let (text_a, text_b) = tokio::try_join!(
        extract(Arc::clone(&backend), docs.left, Side::Left),
        extract(backend, docs.right, Side::Right),
    )?;

    compare_texts(service, &text_a, &text_b).await
}

/// Request and validate a comparison of two already-extracted texts.
pub async fn compare_texts(
    service: &dyn TextService,
    text_a: &str,
    text_b: &str,
) -> Result<ComparisonResult, PipelineError> {
    let raw = request_comparison(service, text_a, text_b).await?;

    let result = match validate::parse_comparison(&raw) {
        Ok(result) => result,
        Err(e) => {
            tracing::debug!(raw = %raw, "rejected comparison payload");
            tracing::warn!(service = service.name(), error = %e, "malformed comparison");
            return Err(e.into());
        }
    };

    let shadowed = result.align().shadowed();
    if shadowed > 0 {
        tracing::warn!(
            shadowed,
            "duplicate category names in a table; only the first of each is paired"
        );
    }

    tracing::info!(
        left = %result.left.name,
        right = %result.right.name,
        left_categories = result.left.categories.len(),
        right_categories = result.right.categories.len(),
        "comparison complete"
    );
    Ok(result)
}

/// Send exactly one instruction embedding both texts, in order.
pub async fn request_comparison(
    service: &dyn TextService,
    text_a: &str,
    text_b: &str,
) -> Result<String, UpstreamError> {
    let instruction = prompt::build_instruction(text_a, text_b);
    tracing::info!(
        service = service.name(),
        instruction_chars = instruction.len(),
        "requesting comparison"
    );

    let raw = service.summarize(&instruction).await;
    if let Err(e) = &raw {
        tracing::warn!(service = service.name(), error = %e, "comparison request failed");
    }
    raw
}

async fn extract(
    backend: Arc<dyn PdfBackend>,
    data: Vec<u8>,
    side: Side,
) -> Result<String, PipelineError> {
    let bytes = data.len();
    let text = tokio::task::spawn_blocking(move || {
        check_pdf_magic(&data)?;
        backend.extract_text(&data)
    })
    .await
    .map_err(|source| PipelineError::ExtractionTask { side, source })?
    .and_then(|text| {
        if text.trim().is_empty() {
            Err(BackendError::EmptyText)
        } else {
            Ok(text)
        }
    })
    .map_err(|source| PipelineError::Extraction { side, source })?;

    tracing::debug!(%side, bytes, chars = text.chars().count(), "extracted text");
    Ok(text)
}
