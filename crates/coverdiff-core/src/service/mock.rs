//! Mock text service for testing.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::{SummarizeFuture, TextService, UpstreamError};

/// A configurable mock response for [`MockService`].
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Answer with this raw text.
    Text(String),
    /// Simulate the boundary timing out.
    Timeout,
    /// Simulate a non-success HTTP status.
    Status(u16),
}

/// A hand-rolled mock implementing [`TextService`] for tests.
///
/// Supports:
/// - A fixed response (used for every call), **or**
/// - A sequence of responses (one per call, repeating the last if exhausted).
/// - Optional per-call latency.
/// - Call counting and recording of every instruction received.
pub struct MockService {
    responses: Mutex<Vec<MockResponse>>,
    fallback: MockResponse,
    delay: Option<Duration>,
    call_count: AtomicUsize,
    instructions: Mutex<Vec<String>>,
}

impl MockService {
    /// Create a mock that always returns `response`.
    pub fn new(response: MockResponse) -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            fallback: response,
            delay: None,
            call_count: AtomicUsize::new(0),
            instructions: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock that always answers with `text`.
    pub fn answering(text: impl Into<String>) -> Self {
        Self::new(MockResponse::Text(text.into()))
    }

    /// Create a mock that returns responses in order, repeating the last one.
    pub fn with_sequence(mut responses: Vec<MockResponse>) -> Self {
        let fallback = responses
            .last()
            .cloned()
            .unwrap_or(MockResponse::Status(500));
        // Reverse so we can pop() from the front cheaply.
        responses.reverse();
        Self {
            responses: Mutex::new(responses),
            ..Self::new(fallback)
        }
    }

    /// Set simulated latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of times `summarize` was called.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Every instruction received, in call order.
    pub fn instructions(&self) -> Vec<String> {
        self.instructions
            .lock()
            .map(|i| i.clone())
            .unwrap_or_default()
    }

    fn next_response(&self) -> MockResponse {
        self.responses
            .lock()
            .ok()
            .and_then(|mut r| r.pop())
            .unwrap_or_else(|| self.fallback.clone())
    }
}

impl TextService for MockService {
    fn name(&self) -> &str {
        "Mock"
    }

    fn summarize<'a>(&'a self, instruction: &'a str) -> SummarizeFuture<'a> {
        Box::pin(async move {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut seen) = self.instructions.lock() {
                seen.push(instruction.to_string());
            }

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            match self.next_response() {
                MockResponse::Text(text) => Ok(text),
                MockResponse::Timeout => Err(UpstreamError::Timeout(
                    self.delay.unwrap_or(Duration::from_secs(1)),
                )),
                MockResponse::Status(status) => Err(UpstreamError::Status {
                    status,
                    body: String::new(),
                }),
            }
        })
    }
}
