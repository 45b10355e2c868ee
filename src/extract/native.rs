//! Local structural PDF parsing.
//!
//! This is the first extraction tier: decode the byte stream as a page-oriented PDF and
//! pull text page by page. A page that fails to yield text is skipped rather than aborting
//! the document, matching the degradation contract of [`super::TieredExtractor`].

use lopdf::Document;

/// Extract text from PDF bytes, or `None` when the document is unparseable,
/// has no pages, or yields no text at all.
pub(crate) fn extract_pdf_text(bytes: &[u8]) -> Option<String> {
    let document = match Document::load_mem(bytes) {
        Ok(document) => document,
        Err(error) => {
            tracing::debug!(error = %error, "Local PDF parse failed");
            return None;
        }
    };

    let pages = document.get_pages();
    if pages.is_empty() {
        tracing::debug!("No pages found in PDF");
        return None;
    }

    let page_count = pages.len();
    let mut text = String::new();
    for &number in pages.keys() {
        match document.extract_text(&[number]) {
            Ok(page_text) => {
                let page_text = page_text.trim();
                if !page_text.is_empty() {
                    text.push_str(page_text);
                    text.push_str("\n\n");
                }
                tracing::trace!(page = number, pages = page_count, "Extracted page");
            }
            Err(error) => {
                // Page-level failures are isolated; the remaining pages still count.
                tracing::warn!(page = number, error = %error, "Failed to extract page text");
            }
        }
    }

    let text = text.trim();
    if text.is_empty() {
        tracing::debug!(pages = page_count, "Local parse produced no text");
        None
    } else {
        Some(text.to_string())
    }
}
