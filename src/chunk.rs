//! Paragraph-boundary text chunker.
//!
//! Splits extracted document text into [`DocumentChunk`]s bounded by a
//! character budget. Splitting occurs on paragraph boundaries (runs of two
//! or more newlines) to keep each chunk coherent. A single paragraph larger
//! than the budget is kept whole as one oversized chunk rather than split
//! mid-paragraph — an intentional simplicity trade-off.
//!
//! Pure and deterministic: identical input always yields identical chunks.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::DocumentChunk;

/// Default chunk budget in characters.
pub const DEFAULT_MAX_CHARS: usize = 500;

fn paragraph_boundary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{2,}").expect("paragraph boundary pattern"))
}

/// Split text into chunks on paragraph boundaries, respecting `max_chars`.
///
/// Paragraphs are greedily accumulated into a buffer; the buffer is flushed
/// as a chunk when appending the next paragraph would exceed the budget and
/// the buffer is non-empty. Indices are contiguous from 0 and each chunk id
/// is `"<source>-chunk-<index>"`. Buffers that trim to nothing are dropped,
/// so no chunk has empty text.
pub fn chunk_text(text: &str, source: &str, max_chars: usize) -> Vec<DocumentChunk> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut index: i64 = 0;

    for para in paragraph_boundary().split(text) {
        let combined = current.chars().count() + para.chars().count();
        if combined > max_chars && !current.is_empty() {
            flush(&mut chunks, &current, &mut index, source);
            current.clear();
            current.push_str(para);
        } else {
            if !current.is_empty() {
                current.push_str("\n\n");
            }
            current.push_str(para);
        }
    }

    flush(&mut chunks, &current, &mut index, source);
    chunks
}

fn flush(chunks: &mut Vec<DocumentChunk>, buffer: &str, index: &mut i64, source: &str) {
    let text = buffer.trim();
    if text.is_empty() {
        return;
    }
    chunks.push(DocumentChunk {
        id: format!("{}-chunk-{}", source, *index),
        text: text.to_string(),
        source: source.to_string(),
        index: *index,
    });
    *index += 1;
}
