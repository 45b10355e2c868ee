//! Paragraph-aligned bounded chunking.
//!
//! The rule is deliberately simple: split on blank lines, accumulate paragraphs greedily,
//! and close the running buffer when the next paragraph would push it past the character
//! budget. The budget is soft in one direction only — a single paragraph longer than the
//! budget is still emitted whole, never split mid-paragraph.

/// Split text into bounded, paragraph-aligned chunks.
///
/// Returns an empty vector for blank input. Emitted chunks are trimmed, non-empty, and in
/// document order; concatenating them reproduces every paragraph of the input.
pub(crate) fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut buffer = String::new();
    let mut buffer_chars = 0usize;

    for paragraph in text.split("\n\n") {
        let paragraph_chars = paragraph.chars().count();
        if buffer_chars + paragraph_chars > max_chars && !buffer.is_empty() {
            push_chunk(&mut chunks, &buffer);
            buffer.clear();
            buffer_chars = 0;
        }
        buffer.push_str(paragraph);
        buffer.push_str("\n\n");
        buffer_chars += paragraph_chars + 2;
    }

    push_chunk(&mut chunks, &buffer);

    if chunks.is_empty() {
        // The splitting rule produced nothing usable; fall back to the whole text.
        return vec![text.to_string()];
    }
    chunks
}

fn push_chunk(chunks: &mut Vec<String>, buffer: &str) {
    let trimmed = buffer.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}
