use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing pipeline activity.
#[derive(Default)]
pub struct PipelineMetrics {
    documents_processed: AtomicU64,
    documents_failed: AtomicU64,
    chunks_embedded: AtomicU64,
    degraded_embeddings: AtomicU64,
}

impl PipelineMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successfully processed document along with its chunk counts.
    pub fn record_success(&self, chunk_count: u64, degraded_count: u64) {
        self.documents_processed.fetch_add(1, Ordering::Relaxed);
        self.chunks_embedded.fetch_add(chunk_count, Ordering::Relaxed);
        self.degraded_embeddings
            .fetch_add(degraded_count, Ordering::Relaxed);
    }

    /// Record a document run that ended in a structured failure.
    pub fn record_failure(&self) {
        self.documents_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_processed: self.documents_processed.load(Ordering::Relaxed),
            documents_failed: self.documents_failed.load(Ordering::Relaxed),
            chunks_embedded: self.chunks_embedded.load(Ordering::Relaxed),
            degraded_embeddings: self.degraded_embeddings.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of pipeline counters used for reporting.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Number of documents converted into embeddings since startup.
    pub documents_processed: u64,
    /// Number of documents whose run ended in a structured error.
    pub documents_failed: u64,
    /// Total chunk count embedded across all processed documents.
    pub chunks_embedded: u64,
    /// Chunks whose embedding degraded to the zero-vector fallback.
    pub degraded_embeddings: u64,
}
