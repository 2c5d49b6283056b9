use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use coverdiff_core::{Config, OpenAiService};
use coverdiff_pdf_mupdf::MupdfBackend;
use tower_http::cors::CorsLayer;

mod handlers;
mod models;
mod state;
mod upload;

use state::AppState;

fn router(state: Arc<AppState>, max_upload_mb: u32) -> axum::Router {
    // Both documents travel in one body.
    let body_limit = DefaultBodyLimit::max(2 * max_upload_mb as usize * 1024 * 1024);

    axum::Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/pdfData", post(handlers::compare::compare))
        .route("/pdfData/aligned", post(handlers::compare::compare_aligned))
        .layer(body_limit)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coverdiff_core=info,coverdiff_web=info".into()),
        )
        .init();

    let config = Config::load();
    tracing::debug!(?config, "resolved configuration");

    let service = OpenAiService::from_config(&config)
        .context("no API key configured: set OPENAI_API_KEY or [service].api_key")?;
    let backend = MupdfBackend::new()
        .with_header_exclusion(config.header_exclusion)
        .with_footer_exclusion(config.footer_exclusion);

    let state = Arc::new(AppState {
        backend: Arc::new(backend),
        service: Arc::new(service),
    });

    let addr: SocketAddr = config
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {:?}", config.bind))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, model = %config.model, "listening");

    axum::serve(listener, router(state, config.max_upload_mb))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use coverdiff_core::service::mock::{MockResponse, MockService};
    use coverdiff_core::{BackendError, PdfBackend};
    use tower::ServiceExt;

    const BOUNDARY: &str = "coverdiff-test-boundary";

    const ANSWER: &str = r#"[
        {"name": "Mutuelle X", "categories": [
            {"name": "Dentaire", "warranties": [
                {"name": "Soins", "summary": "100%", "specialRules": "Aucune"}
            ]}
        ]},
        {"name": "Mutuelle Y", "categories": [
            {"name": "Dentaire", "warranties": []},
            {"name": "Optique", "warranties": []}
        ]}
    ]"#;

    struct PlainTextBackend;

    impl PdfBackend for PlainTextBackend {
        fn extract_text(&self, data: &[u8]) -> Result<String, BackendError> {
            Ok(String::from_utf8_lossy(&data[5..]).into_owned())
        }
    }

    fn app(service: Arc<MockService>) -> axum::Router {
        let state = Arc::new(AppState {
            backend: Arc::new(PlainTextBackend),
            service,
        });
        router(state, 1)
    }

    fn multipart(parts: &[(&str, &str)]) -> Request<Body> {
        let mut body = Vec::new();
        for (name, data) in parts {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
                     filename=\"{name}.pdf\"\r\nContent-Type: application/pdf\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data.as_bytes());
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/pdfData")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(resp: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn two_files_return_the_pair() {
        let service = Arc::new(MockService::answering(ANSWER));
        let req = multipart(&[("file1", "%PDF-left"), ("file2", "%PDF-right")]);

        let resp = app(service.clone()).oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let json = json_body(resp).await;
        assert_eq!(json[0]["name"], "Mutuelle X");
        assert_eq!(json[1]["categories"][1]["name"], "Optique");
        assert_eq!(service.call_count(), 1);
    }

    #[tokio::test]
    async fn missing_file_is_bad_request_without_service_call() {
        let service = Arc::new(MockService::answering(ANSWER));
        let req = multipart(&[("file1", "%PDF-left")]);

        let resp = app(service.clone()).oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(resp).await["error"], "Missing file(s).");
        assert_eq!(service.call_count(), 0);
    }

    #[tokio::test]
    async fn empty_file_field_counts_as_missing() {
        let service = Arc::new(MockService::answering(ANSWER));
        let req = multipart(&[("file1", "%PDF-left"), ("file2", "")]);

        let resp = app(service.clone()).oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(service.call_count(), 0);
    }

    #[tokio::test]
    async fn non_multipart_request_gets_json_error() {
        let service = Arc::new(MockService::answering(ANSWER));
        let req = Request::builder()
            .method("POST")
            .uri("/pdfData")
            .body(Body::empty())
            .unwrap();

        let resp = app(service.clone()).oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(resp).await["error"], "Missing file(s).");
        assert_eq!(service.call_count(), 0);
    }

    #[tokio::test]
    async fn oversized_upload_is_payload_too_large() {
        let service = Arc::new(MockService::answering(ANSWER));
        let big = format!("%PDF-{}", "a".repeat(3 * 1024 * 1024));
        let req = multipart(&[("file1", big.as_str()), ("file2", "%PDF-right")]);

        let resp = app(service.clone()).oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json_body(resp).await["error"], "Upload too large.");
        assert_eq!(service.call_count(), 0);
    }

    #[tokio::test]
    async fn non_pdf_upload_is_bad_request() {
        let service = Arc::new(MockService::answering(ANSWER));
        let req = multipart(&[("file1", "%PDF-left"), ("file2", "hello")]);

        let resp = app(service.clone()).oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(resp).await["error"], "Failed to read PDF.");
        assert_eq!(service.call_count(), 0);
    }

    #[tokio::test]
    async fn malformed_answer_is_server_error_without_raw_text() {
        let service = Arc::new(MockService::answering("Sure! Here is the comparison."));
        let req = multipart(&[("file1", "%PDF-left"), ("file2", "%PDF-right")]);

        let resp = app(service).oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_body(resp).await;
        assert_eq!(json["error"], "Failed to compare documents.");
        assert!(!json.to_string().contains("Sure!"));
    }

    #[tokio::test]
    async fn upstream_timeout_is_gateway_timeout() {
        let service = Arc::new(MockService::new(MockResponse::Timeout));
        let req = multipart(&[("file1", "%PDF-left"), ("file2", "%PDF-right")]);

        let resp = app(service).oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn aligned_endpoint_pairs_categories() {
        let service = Arc::new(MockService::answering(ANSWER));
        let mut req = multipart(&[("file1", "%PDF-left"), ("file2", "%PDF-right")]);
        *req.uri_mut() = "/pdfData/aligned".parse().unwrap();

        let resp = app(service).oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let json = json_body(resp).await;
        assert_eq!(json["tables"][0], "Mutuelle X");
        assert_eq!(json["tables"][1], "Mutuelle Y");
        assert_eq!(json["categories"][0]["name"], "Dentaire");
        assert_eq!(json["categories"][1]["name"], "Optique");
        assert!(json["categories"][1]["left"].is_null());
        assert_eq!(json["categories"][1]["right"]["name"], "Optique");
    }

    #[tokio::test]
    async fn health_check() {
        let service = Arc::new(MockService::answering(ANSWER));
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let resp = app(service).oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
    }
}
