//! Text-understanding service trait and implementations.

pub mod mock;
pub mod openai;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;

pub use openai::OpenAiService;

/// Failure of the single outbound call.
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("service did not answer within {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("request to service failed: {0}")]
    Transport(String),
    #[error("service response envelope is unusable: {0}")]
    InvalidEnvelope(String),
}

impl UpstreamError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, UpstreamError::Timeout(_))
    }
}

/// Boxed future returned by [`TextService::summarize`].
pub type SummarizeFuture<'a> =
    Pin<Box<dyn Future<Output = Result<String, UpstreamError>> + Send + 'a>>;

/// A best-effort, instruction-driven text transformation.
///
/// The answer is not guaranteed to follow any schema; callers validate it.
pub trait TextService: Send + Sync {
    /// Short name used in logs (e.g. "OpenAI").
    fn name(&self) -> &str;

    /// Send one instruction and return the raw textual answer.
    fn summarize<'a>(&'a self, instruction: &'a str) -> SummarizeFuture<'a>;
}
