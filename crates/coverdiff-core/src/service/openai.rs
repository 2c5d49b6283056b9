//! OpenAI Responses API client.
//!
//! Sends `{model, input}` to `{base_url}/responses` and concatenates every
//! `output_text` part of the returned message items. One request per call,
//! no retries.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{SummarizeFuture, TextService, UpstreamError};
use crate::config_file::Config;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-5-nano";

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct ResponsesEnvelope {
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// HTTP client for the OpenAI Responses API.
#[derive(Clone)]
pub struct OpenAiService {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl std::fmt::Debug for OpenAiService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiService")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAiService {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(crate::config_file::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Build a client from resolved configuration. Returns `None` when no API
    /// key is configured.
    pub fn from_config(config: &Config) -> Option<Self> {
        let api_key = config.api_key.clone()?;
        Some(
            Self::new(api_key)
                .with_base_url(&config.base_url)
                .with_model(&config.model)
                .with_timeout(Duration::from_secs(config.timeout_secs)),
        )
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn post(&self, instruction: &str) -> Result<String, UpstreamError> {
        let url = format!("{}/responses", self.base_url);
        let request = ResponsesRequest {
            model: &self.model,
            input: instruction,
        };

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: ResponsesEnvelope = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                UpstreamError::Timeout(self.timeout)
            } else {
                UpstreamError::InvalidEnvelope(e.to_string())
            }
        })?;

        output_text(&envelope)
    }

    fn map_transport(&self, e: reqwest::Error) -> UpstreamError {
        if e.is_timeout() {
            UpstreamError::Timeout(self.timeout)
        } else {
            UpstreamError::Transport(e.to_string())
        }
    }
}

/// Concatenate the `output_text` parts of every `message` item.
fn output_text(envelope: &ResponsesEnvelope) -> Result<String, UpstreamError> {
    let text: String = envelope
        .output
        .iter()
        .filter(|item| item.kind == "message")
        .flat_map(|item| item.content.iter())
        .filter(|part| part.kind == "output_text")
        .filter_map(|part| part.text.as_deref())
        .collect();

    if text.is_empty() {
        return Err(UpstreamError::InvalidEnvelope(
            "no output_text in response".into(),
        ));
    }
    Ok(text)
}

impl TextService for OpenAiService {
    fn name(&self) -> &str {
        "OpenAI"
    }

    fn summarize<'a>(&'a self, instruction: &'a str) -> SummarizeFuture<'a> {
        Box::pin(self.post(instruction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(json: &str) -> ResponsesEnvelope {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn collects_output_text_from_message_items() {
        let env = envelope(
            r#"{
                "id": "resp_1",
                "status": "completed",
                "output": [
                    {"type": "reasoning", "id": "rs_1", "summary": []},
                    {"type": "message", "role": "assistant", "content": [
                        {"type": "output_text", "text": "[{\"name\":", "annotations": []},
                        {"type": "output_text", "text": " \"A\"}]", "annotations": []}
                    ]}
                ]
            }"#,
        );
        assert_eq!(output_text(&env).unwrap(), r#"[{"name": "A"}]"#);
    }

    #[test]
    fn ignores_refusals_and_non_message_items() {
        let env = envelope(
            r#"{"output": [
                {"type": "reasoning"},
                {"type": "message", "content": [{"type": "refusal", "refusal": "no"}]}
            ]}"#,
        );
        assert!(matches!(
            output_text(&env),
            Err(UpstreamError::InvalidEnvelope(_))
        ));
    }

    #[test]
    fn missing_output_is_invalid_envelope() {
        let env = envelope(r#"{"id": "resp_2"}"#);
        assert!(output_text(&env).is_err());
    }

    #[test]
    fn request_body_has_model_and_input() {
        let body = serde_json::to_value(ResponsesRequest {
            model: DEFAULT_MODEL,
            input: "compare",
        })
        .unwrap();
        assert_eq!(body["model"], "gpt-5-nano");
        assert_eq!(body["input"], "compare");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let svc = OpenAiService::new("k").with_base_url("http://localhost:8080/v1/");
        assert_eq!(svc.base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn debug_redacts_api_key() {
        let svc = OpenAiService::new("sk-secret");
        let dbg = format!("{svc:?}");
        assert!(!dbg.contains("sk-secret"));
        assert!(dbg.contains("gpt-5-nano"));
    }

    mod http {
        use super::*;
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::{TcpListener, TcpStream};
        use tokio::task::JoinHandle;

        /// Serve one canned HTTP response on a local port and hand back the
        /// raw request that was received.
        async fn serve_once(
            status: &'static str,
            body: &'static str,
            delay: Duration,
        ) -> (String, JoinHandle<String>) {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let handle = tokio::spawn(async move {
                let (mut sock, _) = listener.accept().await.unwrap();
                let request = read_request(&mut sock).await;
                tokio::time::sleep(delay).await;
                let reply = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: application/json\r\n\
                     Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = sock.write_all(reply.as_bytes()).await;
                let _ = sock.shutdown().await;
                request
            });
            (format!("http://{addr}/v1"), handle)
        }

        async fn read_request(sock: &mut TcpStream) -> String {
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = sock.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf).to_ascii_lowercase();
                if let Some(end) = text.find("\r\n\r\n") {
                    let len = text[..end]
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if buf.len() >= end + 4 + len {
                        break;
                    }
                }
            }
            String::from_utf8_lossy(&buf).into_owned()
        }

        fn local_service(base_url: &str, timeout: Duration) -> OpenAiService {
            let client = reqwest::Client::builder().no_proxy().build().unwrap();
            OpenAiService::new("sk-test")
                .with_client(client)
                .with_base_url(base_url)
                .with_timeout(timeout)
        }

        #[tokio::test]
        async fn posts_to_responses_and_returns_output_text() {
            let body = r#"{"output":[{"type":"message","content":[{"type":"output_text","text":"[]"}]}]}"#;
            let (url, server) = serve_once("200 OK", body, Duration::ZERO).await;

            let text = local_service(&url, Duration::from_secs(5))
                .summarize("compare these")
                .await
                .unwrap();

            assert_eq!(text, "[]");
            let request = server.await.unwrap();
            assert!(request.starts_with("POST /v1/responses "));
            assert!(request.to_ascii_lowercase().contains("authorization: bearer sk-test"));
            assert!(request.contains(r#""input":"compare these""#));
        }

        #[tokio::test]
        async fn slow_server_is_timeout() {
            let (url, _server) = serve_once("200 OK", "{}", Duration::from_secs(10)).await;

            let err = local_service(&url, Duration::from_millis(300))
                .summarize("x")
                .await
                .unwrap_err();

            assert!(matches!(err, UpstreamError::Timeout(d) if d == Duration::from_millis(300)));
            assert!(err.is_timeout());
        }

        #[tokio::test]
        async fn non_success_status_is_status_error() {
            let (url, _server) = serve_once("503 Service Unavailable", "busy", Duration::ZERO).await;

            let err = local_service(&url, Duration::from_secs(5))
                .summarize("x")
                .await
                .unwrap_err();

            match err {
                UpstreamError::Status { status, body } => {
                    assert_eq!(status, 503);
                    assert_eq!(body, "busy");
                }
                other => panic!("expected status error, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn non_json_success_is_invalid_envelope() {
            let (url, _server) = serve_once("200 OK", "not json!", Duration::ZERO).await;

            let err = local_service(&url, Duration::from_secs(5))
                .summarize("x")
                .await
                .unwrap_err();

            assert!(matches!(err, UpstreamError::InvalidEnvelope(_)));
        }
    }
}

