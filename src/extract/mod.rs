//! Two-tier document text extraction.
//!
//! Extraction degrades rather than fails: the local structural parse runs first, and any
//! soft failure there (unparseable bytes, zero pages, no text) falls through to the remote
//! vision tier. Absence of a value is the sole failure signal crossing this boundary; no
//! error escapes the extractor.

mod native;
mod vision;

pub use vision::{VisionError, VisionExtractor};
pub(crate) use vision::read_error_message;

/// Which extraction tier produced the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionSource {
    /// Local structural PDF parse.
    Native,
    /// Remote vision-model transcription fallback.
    Vision,
}

/// Text recovered from a document, tagged with the tier that produced it.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    /// Recovered text, trimmed and non-empty.
    pub text: String,
    /// Tier that produced the text.
    pub source: ExtractionSource,
}

/// Extractor that tries the local parser first and degrades to the vision service.
pub struct TieredExtractor {
    vision: VisionExtractor,
}

impl TieredExtractor {
    /// Build an extractor around the given vision fallback client.
    pub fn new(vision: VisionExtractor) -> Self {
        Self { vision }
    }

    /// Recover text from document bytes.
    pub async fn extract(&self, bytes: &[u8]) -> Option<ExtractedText> {
        if let Some(text) = native::extract_pdf_text(bytes) {
            tracing::debug!(chars = text.len(), "Extracted text with local parser");
            return Some(ExtractedText {
                text,
                source: ExtractionSource::Native,
            });
        }

        tracing::info!("Local extraction yielded no text; falling back to vision service");
        match self.vision.extract(bytes).await {
            Ok(text) => {
                tracing::debug!(chars = text.len(), "Extracted text with vision service");
                Some(ExtractedText {
                    text,
                    source: ExtractionSource::Vision,
                })
            }
            Err(error) => {
                tracing::warn!(error = %error, "Vision extraction failed");
                None
            }
        }
    }
}
