//! Core data types and error definitions for the embedding pipeline.

use serde::Serialize;
use thiserror::Error;

/// A bounded, paragraph-aligned segment of extracted text.
///
/// Chunks are produced in document order and never reordered downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Zero-based position of the chunk within the document.
    pub index: usize,
    /// Non-empty chunk text.
    pub text: String,
}

/// A chunk together with the embedding produced for it.
#[derive(Debug, Clone, Serialize)]
pub struct ChunkEmbedding {
    /// Zero-based position of the chunk within the document.
    pub index: usize,
    /// Text the vector was computed from, kept for traceability.
    pub text: String,
    /// Embedding vector of the configured dimensionality.
    pub embedding: Vec<f32>,
    /// True when the vector is the zero-vector substitution for a failed call.
    pub degraded: bool,
}

/// Provenance recorded alongside a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingMetadata {
    /// Embedding model that produced the vectors.
    pub model: String,
    /// RFC 3339 wall-clock time at which aggregation completed.
    pub generated_at: String,
}

/// Aggregated output of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingData {
    /// Component-wise mean of all chunk vectors.
    pub document_embedding: Vec<f32>,
    /// Per-chunk embeddings in document order.
    pub chunks: Vec<ChunkEmbedding>,
    /// Provenance for the run.
    pub metadata: EmbeddingMetadata,
}

/// Final outcome of one document run.
///
/// This is the only artifact that escapes the pipeline. Every failure path is represented
/// as data; `process` never raises to the caller.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PipelineResult {
    /// The document was embedded end to end.
    Success {
        /// Document vector, chunk vectors, and provenance.
        embedding_data: EmbeddingData,
    },
    /// A stage failed; the message describes which one.
    Error {
        /// Human-readable failure description.
        message: String,
    },
}

impl PipelineResult {
    /// Build a failure outcome from any displayable message.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// True for the success variant.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Errors raised while retrieving source bytes, before the pipeline starts.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The document host answered with a non-success status.
    #[error("Failed to fetch PDF: {0}")]
    Status(u16),
    /// The HTTP call itself failed.
    #[error("Failed to fetch PDF: {0}")]
    Transport(#[from] reqwest::Error),
}
