#![deny(missing_docs)]

//! Core library for the docembed document embedding service.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Embedding client abstraction and adapters.
pub mod embedding;
/// Two-tier document text extraction.
pub mod extract;
/// Structured logging and tracing setup.
pub mod logging;
/// Processing metrics helpers.
pub mod metrics;
/// Extraction, chunking, embedding, and aggregation pipeline.
pub mod pipeline;
