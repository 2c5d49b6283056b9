use thiserror::Error;

/// Magic bytes every PDF buffer starts with.
pub const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open PDF: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("document contains no extractable text")]
    EmptyText,
}

/// Trait for PDF text extraction backends.
///
/// Implementors turn an in-memory document into its visible text. Identical
/// bytes must yield identical text for a given backend version.
pub trait PdfBackend: Send + Sync {
    /// Extract the full text content of a PDF buffer.
    fn extract_text(&self, data: &[u8]) -> Result<String, BackendError>;
}

/// Reject buffers that cannot be a PDF before handing them to a backend.
pub fn check_pdf_magic(data: &[u8]) -> Result<(), BackendError> {
    if data.starts_with(PDF_MAGIC) {
        Ok(())
    } else {
        Err(BackendError::OpenError(
            "buffer does not start with %PDF- header".into(),
        ))
    }
}
