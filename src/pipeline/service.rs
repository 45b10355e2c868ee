//! Pipeline orchestration: fetch, extract, chunk, embed, aggregate.

use crate::{
    config::Config,
    embedding::{EmbeddingClient, EmbeddingOutcome, OpenAiEmbeddingClient},
    extract::{TieredExtractor, VisionExtractor},
    metrics::{MetricsSnapshot, PipelineMetrics},
    pipeline::{
        aggregate::mean_vector,
        chunking::chunk_text,
        types::{
            Chunk, ChunkEmbedding, EmbeddingData, EmbeddingMetadata, FetchError, PipelineResult,
        },
    },
};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures_util::{StreamExt, stream};
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;

/// Coordinates one document's journey from raw bytes to a document-level vector.
///
/// The pipeline owns its extractor, embedding client, and HTTP transport; construct it once
/// near process start from a [`Config`] and share it through an `Arc`. Each `process` call
/// owns its own transient data, so concurrent documents need no coordination.
pub struct Pipeline {
    extractor: TieredExtractor,
    embedding_client: Box<dyn EmbeddingClient + Send + Sync>,
    http: reqwest::Client,
    embedding_model: String,
    chunk_max_chars: usize,
    embed_concurrency: usize,
    metrics: Arc<PipelineMetrics>,
}

/// Abstraction over the pipeline used by external surfaces (HTTP handlers, tests).
#[async_trait]
pub trait ProcessApi: Send + Sync {
    /// Decode a base64 document payload and run the full pipeline on it.
    async fn process_base64(&self, payload: &str) -> PipelineResult;

    /// Fetch a document by URL and run the full pipeline on it.
    async fn process_from_url(&self, url: &str) -> PipelineResult;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl Pipeline {
    /// Build a pipeline with clients derived from the given configuration.
    ///
    /// Fails only when the HTTP transport cannot be constructed.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("docembed/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        let vision = VisionExtractor::new(http.clone(), config);
        let embedding_client = Box::new(OpenAiEmbeddingClient::new(http.clone(), config));
        tracing::debug!(
            model = %config.embedding_model,
            dimension = config.embedding_dimension,
            chunk_max_chars = config.chunk_max_chars,
            concurrency = config.embed_concurrency,
            "Initialized pipeline"
        );

        Ok(Self {
            extractor: TieredExtractor::new(vision),
            embedding_client,
            http,
            embedding_model: config.embedding_model.clone(),
            chunk_max_chars: config.chunk_max_chars,
            embed_concurrency: config.embed_concurrency,
            metrics: Arc::new(PipelineMetrics::new()),
        })
    }

    /// Run the full pipeline on raw document bytes.
    ///
    /// Every failure path comes back as [`PipelineResult::Error`]; this never panics or
    /// returns early with an exception-like escape.
    pub async fn process(&self, bytes: &[u8]) -> PipelineResult {
        tracing::info!(bytes = bytes.len(), "Processing document");

        let Some(extracted) = self.extractor.extract(bytes).await else {
            tracing::warn!("Text extraction failed");
            self.metrics.record_failure();
            return PipelineResult::error("Text extraction failed");
        };

        let chunks: Vec<Chunk> = chunk_text(&extracted.text, self.chunk_max_chars)
            .into_iter()
            .enumerate()
            .map(|(index, text)| Chunk { index, text })
            .collect();
        if chunks.is_empty() {
            tracing::warn!("No text chunks created");
            self.metrics.record_failure();
            return PipelineResult::error("No text chunks created");
        }
        tracing::debug!(
            chunks = chunks.len(),
            source = ?extracted.source,
            "Chunked document"
        );

        // Per-chunk calls carry no data dependency on each other; `buffered` bounds the
        // in-flight requests while keeping outputs in document order.
        let client = self.embedding_client.as_ref();
        let total = chunks.len();
        let embed_futures: Vec<_> = chunks
            .iter()
            .map(|chunk| async move {
                tracing::trace!(chunk = chunk.index, total, "Embedding chunk");
                client.embed(&chunk.text).await
            })
            .collect();
        let outcomes: Vec<EmbeddingOutcome> = stream::iter(embed_futures)
            .buffered(self.embed_concurrency)
            .collect()
            .await;

        let chunk_embeddings: Vec<ChunkEmbedding> = chunks
            .into_iter()
            .zip(outcomes)
            .map(|(chunk, outcome)| ChunkEmbedding {
                index: chunk.index,
                text: chunk.text,
                embedding: outcome.vector,
                degraded: outcome.degraded,
            })
            .collect();

        let vectors: Vec<&[f32]> = chunk_embeddings
            .iter()
            .map(|chunk| chunk.embedding.as_slice())
            .collect();
        let document_embedding = mean_vector(&vectors);

        let degraded = chunk_embeddings
            .iter()
            .filter(|chunk| chunk.degraded)
            .count();
        self.metrics
            .record_success(chunk_embeddings.len() as u64, degraded as u64);
        tracing::info!(
            chunks = chunk_embeddings.len(),
            degraded,
            "Document embedded"
        );

        PipelineResult::Success {
            embedding_data: EmbeddingData {
                document_embedding,
                chunks: chunk_embeddings,
                metadata: EmbeddingMetadata {
                    model: self.embedding_model.clone(),
                    generated_at: current_timestamp_rfc3339(),
                },
            },
        }
    }

    /// Decode a base64 document payload and process it.
    pub async fn process_base64(&self, payload: &str) -> PipelineResult {
        match STANDARD.decode(payload.trim()) {
            Ok(bytes) => self.process(&bytes).await,
            Err(error) => {
                tracing::warn!(error = %error, "Rejected document payload");
                self.metrics.record_failure();
                PipelineResult::error("Invalid base64 document payload")
            }
        }
    }

    /// Fetch a document by URL and process it.
    pub async fn process_from_url(&self, url: &str) -> PipelineResult {
        tracing::info!(url, "Fetching document");
        match self.fetch_document(url).await {
            Ok(bytes) => self.process(&bytes).await,
            Err(error) => {
                tracing::warn!(url, error = %error, "Document fetch failed");
                self.metrics.record_failure();
                PipelineResult::error(error.to_string())
            }
        }
    }

    /// Return the current metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    async fn fetch_document(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl ProcessApi for Pipeline {
    async fn process_base64(&self, payload: &str) -> PipelineResult {
        Pipeline::process_base64(self, payload).await
    }

    async fn process_from_url(&self, url: &str) -> PipelineResult {
        Pipeline::process_from_url(self, url).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        Pipeline::metrics_snapshot(self)
    }
}

/// Current wall-clock time formatted for result provenance.
fn current_timestamp_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}
