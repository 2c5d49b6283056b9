use thiserror::Error;

use crate::backend::BackendError;
use crate::service::UpstreamError;
use crate::validate::MalformedComparisonError;

/// Which of the two input documents an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Left => write!(f, "first document"),
            Side::Right => write!(f, "second document"),
        }
    }
}

/// Terminal failure of one comparison job. None of these are retried.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("missing {0}")]
    MissingInput(Side),
    #[error("could not read {side}: {source}")]
    Extraction {
        side: Side,
        #[source]
        source: BackendError,
    },
    #[error("extraction of {side} did not complete: {source}")]
    ExtractionTask {
        side: Side,
        #[source]
        source: tokio::task::JoinError,
    },
    #[error("comparison request failed: {0}")]
    UpstreamRequest(#[from] UpstreamError),
    #[error("comparison response is malformed: {0}")]
    MalformedComparison(#[from] MalformedComparisonError),
}

/// What a caller is told, without exposing internal service responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The inputs themselves are unusable.
    BadInput,
    /// The inputs were fine but producing the comparison failed.
    ProcessingFailed,
}

impl PipelineError {
    pub fn kind(&self) -> FailureKind {
        match self {
            PipelineError::MissingInput(_) | PipelineError::Extraction { .. } => {
                FailureKind::BadInput
            }
            PipelineError::ExtractionTask { .. }
            | PipelineError::UpstreamRequest(_)
            | PipelineError::MalformedComparison(_) => FailureKind::ProcessingFailed,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, PipelineError::UpstreamRequest(e) if e.is_timeout())
    }
}
