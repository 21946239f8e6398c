//! Core data models for the ingestion and retrieval pipeline.
//!
//! These types represent uploaded files, their extracted chunks, and the
//! search hits returned to the chat layer.

/// A bounded-size segment of a document's extracted text, the unit of
/// retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChunk {
    /// Display id, `"<sourceName>-chunk-<index>"`. Unique within a document;
    /// two uploads sharing a display name can collide (known limitation —
    /// persistence keys chunks by document id + index instead).
    pub id: String,
    /// Chunk text, trimmed of leading and trailing whitespace. Never empty.
    pub text: String,
    /// Display name of the originating document (not its persisted id).
    pub source: String,
    /// Zero-based position within the document's extracted text. Contiguous
    /// from 0 within a single extraction run.
    pub index: i64,
}

/// A single uploaded file plus its extracted, chunked text and metadata.
///
/// Immutable after creation; deleted atomically with all of its chunks.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    /// Generated as `doc-<millis-timestamp>-<random suffix>`.
    pub id: String,
    pub name: String,
    /// Size of the uploaded bytes.
    pub size: i64,
    /// Declared MIME type, or empty when the caller supplied none.
    pub content_type: String,
    /// Creation time, milliseconds since the Unix epoch.
    pub uploaded_at: i64,
    /// Chunks in index order, owned exclusively by this document.
    pub chunks: Vec<DocumentChunk>,
}

/// Raw uploaded file as handed to the pipeline: a display name, the declared
/// content type (possibly empty or wrong — the extension is the fallback
/// authority), and the raw bytes.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

/// A ranked chunk paired with the display name of its owning document.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub chunk: DocumentChunk,
    pub doc_name: String,
}
