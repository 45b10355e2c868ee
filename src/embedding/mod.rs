//! Embedding client abstraction and the hosted-API adapter.

use crate::config::Config;
use crate::extract::read_error_message;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

/// Outcome of embedding a single chunk of text.
///
/// The vector always has the configured dimensionality. `degraded` is set when the remote
/// call failed and the zero-vector fallback was substituted, so callers can tell a real
/// embedding from a placeholder without probing the values.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingOutcome {
    /// Embedding vector of the configured dimensionality.
    pub vector: Vec<f32>,
    /// True when the zero-vector fallback was substituted.
    pub degraded: bool,
}

/// Errors raised internally by the embedding provider before fallback substitution.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// The HTTP call could not be completed (connection, timeout, malformed body).
    #[error("embedding request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The service answered with a non-success status.
    #[error("embedding service error ({status}): {message}")]
    Service {
        /// HTTP status returned by the service.
        status: StatusCode,
        /// Error message reported in the response body, when present.
        message: String,
    },
    /// The response carried no embedding vectors.
    #[error("embedding service returned no vectors")]
    EmptyResponse,
    /// The returned vector does not match the configured dimensionality.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimensionality the pipeline is configured for.
        expected: usize,
        /// Dimensionality the service actually returned.
        actual: usize,
    },
}

/// Interface implemented by embedding backends.
///
/// `embed` never fails observably: one bad chunk must not abort the whole document, so
/// implementations degrade to a zero vector and flag it on the outcome.
#[async_trait]
pub trait EmbeddingClient {
    /// Produce an embedding for one chunk of text.
    async fn embed(&self, text: &str) -> EmbeddingOutcome;

    /// Dimensionality of every vector this client produces.
    fn dimension(&self) -> usize;
}

/// Embedding client backed by an OpenAI-compatible `/embeddings` endpoint.
pub struct OpenAiEmbeddingClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    dimension: usize,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
}

impl OpenAiEmbeddingClient {
    /// Construct a client sharing the pipeline's HTTP transport.
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            api_key: config.openai_api_key.clone(),
            model: config.embedding_model.clone(),
            dimension: config.embedding_dimension,
        }
    }

    async fn request_embedding(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let body = json!({
            "model": self.model,
            "input": text,
        });

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = read_error_message(response).await;
            return Err(EmbeddingError::Service { status, message });
        }

        let payload: EmbeddingResponse = response.json().await?;
        let vector = payload
            .data
            .into_iter()
            .next()
            .ok_or(EmbeddingError::EmptyResponse)?
            .embedding;

        if vector.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }

        Ok(vector)
    }
}

#[async_trait]
impl EmbeddingClient for OpenAiEmbeddingClient {
    async fn embed(&self, text: &str) -> EmbeddingOutcome {
        match self.request_embedding(text).await {
            Ok(vector) => EmbeddingOutcome {
                vector,
                degraded: false,
            },
            Err(error) => {
                tracing::warn!(error = %error, "Embedding failed; substituting zero vector");
                EmbeddingOutcome {
                    vector: vec![0.0; self.dimension],
                    degraded: true,
                }
            }
        }
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};

    fn client(base_url: &str, dimension: usize) -> OpenAiEmbeddingClient {
        OpenAiEmbeddingClient::new(Client::new(), &Config::for_tests(base_url, dimension, 2000))
    }

    #[tokio::test]
    async fn embed_returns_first_vector_from_response() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/embeddings")
                    .header("authorization", "Bearer test-key")
                    .json_body_partial(
                        r#"{ "model": "text-embedding-3-small", "input": "chunk body" }"#,
                    );
                then.status(200).json_body(json!({
                    "data": [ { "embedding": [0.25, -0.5, 1.0] } ]
                }));
            })
            .await;

        let outcome = client(&server.base_url(), 3).embed("chunk body").await;

        mock.assert();
        assert!(!outcome.degraded);
        assert_eq!(outcome.vector, vec![0.25, -0.5, 1.0]);
    }

    #[tokio::test]
    async fn embed_substitutes_zero_vector_on_service_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/embeddings");
                then.status(500)
                    .json_body(json!({ "error": { "message": "backend exploded" } }));
            })
            .await;

        let outcome = client(&server.base_url(), 1536).embed("anything").await;

        assert!(outcome.degraded);
        assert_eq!(outcome.vector.len(), 1536);
        assert!(outcome.vector.iter().all(|value| *value == 0.0));
    }

    #[tokio::test]
    async fn embed_treats_dimension_mismatch_as_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/embeddings");
                then.status(200).json_body(json!({
                    "data": [ { "embedding": [0.1, 0.2] } ]
                }));
            })
            .await;

        let outcome = client(&server.base_url(), 4).embed("short vector").await;

        assert!(outcome.degraded);
        assert_eq!(outcome.vector, vec![0.0; 4]);
    }

    #[tokio::test]
    async fn embed_treats_empty_data_as_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/embeddings");
                then.status(200).json_body(json!({ "data": [] }));
            })
            .await;

        let outcome = client(&server.base_url(), 2).embed("no vectors").await;

        assert!(outcome.degraded);
        assert_eq!(outcome.vector, vec![0.0, 0.0]);
    }
}
