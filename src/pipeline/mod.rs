//! Document embedding pipeline: extraction, chunking, embedding, aggregation.

mod aggregate;
mod chunking;
mod service;
pub mod types;

pub use service::{Pipeline, ProcessApi};
pub use types::{
    Chunk, ChunkEmbedding, EmbeddingData, EmbeddingMetadata, FetchError, PipelineResult,
};
