//! HTTP surface for docembed.
//!
//! This module exposes a compact Axum router with a handful of endpoints:
//!
//! - `POST /process` – Run the embedding pipeline on a document supplied either by `url`
//!   (fetched server-side) or as a base64 `document` payload. The response body is the
//!   pipeline outcome itself: `{"status": "success", "embedding_data": {...}}` or
//!   `{"status": "error", "message": "..."}` — stage failures are data, not HTTP errors.
//! - `GET /metrics` – Observe processing counters.
//! - `GET /commands` – Machine-readable command catalog for quick discovery by tools/hosts.

use crate::metrics::MetricsSnapshot;
use crate::pipeline::{PipelineResult, ProcessApi};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Build the HTTP router exposing the processing API surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: ProcessApi + 'static,
{
    Router::new()
        .route("/process", post(process_document::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route("/commands", get(get_commands))
        .with_state(service)
}

/// Request body for the `POST /process` endpoint.
///
/// Exactly one of `url` and `document` must be provided.
#[derive(Deserialize)]
struct ProcessRequest {
    /// URL the document should be fetched from.
    #[serde(default)]
    url: Option<String>,
    /// Base64-encoded document bytes.
    #[serde(default)]
    document: Option<String>,
}

/// Run the pipeline on an uploaded or referenced document.
async fn process_document<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<ProcessRequest>,
) -> Response
where
    S: ProcessApi,
{
    let result: PipelineResult = match (request.url, request.document) {
        (Some(url), None) => service.process_from_url(&url).await,
        (None, Some(document)) => service.process_base64(&document).await,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "status": "error",
                    "message": "Provide exactly one of `url` or `document`"
                })),
            )
                .into_response();
        }
    };

    Json(result).into_response()
}

/// Return processing counters for observability dashboards.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsSnapshot>
where
    S: ProcessApi,
{
    Json(service.metrics_snapshot())
}

/// Descriptor for a single command in the discovery catalog.
#[derive(serde::Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(serde::Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery/UX in hosts and tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "process",
                method: "POST",
                path: "/process",
                description: "Extract text from a document, chunk it, embed each chunk, and return the aggregated document embedding. Supply `url` or a base64 `document`.",
                request_example: Some(json!({
                    "url": "https://example.org/paper.pdf"
                })),
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return processing counters useful for observability dashboards.",
                request_example: None,
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::{create_router, get_commands};
    use crate::metrics::MetricsSnapshot;
    use crate::pipeline::{PipelineResult, ProcessApi};
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode},
    };
    use serde_json::json;
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    #[tokio::test]
    async fn commands_catalog_exposes_process_endpoint() {
        let response = get_commands().await;
        let commands = response.0.commands;
        let process = commands
            .iter()
            .find(|cmd| cmd.name == "process")
            .expect("process command present");

        assert_eq!(process.method, "POST");
        assert_eq!(process.path, "/process");
        assert!(process.description.to_lowercase().contains("embed"));
        assert!(commands.len() >= 2);
    }

    #[tokio::test]
    async fn process_route_dispatches_url_requests() {
        let service = Arc::new(StubPipeline::default());
        let app = create_router(service.clone());

        let response = app
            .oneshot(request(json!({ "url": "https://example.org/doc.pdf" })))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let body: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "stubbed");

        let calls = service.calls.lock().await;
        assert_eq!(calls.as_slice(), ["url:https://example.org/doc.pdf"]);
    }

    #[tokio::test]
    async fn process_route_dispatches_base64_payloads() {
        let service = Arc::new(StubPipeline::default());
        let app = create_router(service.clone());

        let response = app
            .oneshot(request(json!({ "document": "aGVsbG8=" })))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let calls = service.calls.lock().await;
        assert_eq!(calls.as_slice(), ["document:aGVsbG8="]);
    }

    #[tokio::test]
    async fn process_route_rejects_ambiguous_requests() {
        let service = Arc::new(StubPipeline::default());
        let app = create_router(service.clone());

        let response = app
            .oneshot(request(
                json!({ "url": "https://example.org/doc.pdf", "document": "aGVsbG8=" }),
            ))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(service.calls.lock().await.is_empty());
    }

    #[tokio::test]
    async fn process_route_rejects_empty_requests() {
        let service = Arc::new(StubPipeline::default());
        let app = create_router(service);

        let response = app
            .oneshot(request(json!({})))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn metrics_route_returns_snapshot() {
        let service = Arc::new(StubPipeline::default());
        let app = create_router(service);

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/metrics")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let body: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(body["documents_processed"], 7);
        assert_eq!(body["degraded_embeddings"], 1);
    }

    fn request(payload: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/process")
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request")
    }

    #[derive(Default)]
    struct StubPipeline {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ProcessApi for StubPipeline {
        async fn process_base64(&self, payload: &str) -> PipelineResult {
            self.calls.lock().await.push(format!("document:{payload}"));
            PipelineResult::error("stubbed")
        }

        async fn process_from_url(&self, url: &str) -> PipelineResult {
            self.calls.lock().await.push(format!("url:{url}"));
            PipelineResult::error("stubbed")
        }

        fn metrics_snapshot(&self) -> MetricsSnapshot {
            MetricsSnapshot {
                documents_processed: 7,
                documents_failed: 2,
                chunks_embedded: 21,
                degraded_embeddings: 1,
            }
        }
    }
}
