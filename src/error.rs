//! Structured error taxonomy for the ingestion and retrieval pipeline.
//!
//! Callers branch on the variant, never on message text. Every failure is
//! local to a single file or store operation; a failed upload leaves
//! previously stored documents untouched.

use std::fmt;

/// Errors produced by extraction, ingestion, and storage.
#[derive(Debug)]
pub enum Error {
    /// Neither the declared MIME type nor the filename extension matches a
    /// supported format. Reported immediately, no partial state created.
    UnsupportedFormat(String),
    /// A format-specific parser failed, or extraction produced no usable
    /// text. The message carries the cause and a remediation hint.
    ExtractionFailed(String),
    /// A generated document id collided with an existing record.
    DuplicateId(String),
    /// The embedded database rejected or aborted the operation.
    StorageFailure(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnsupportedFormat(what) => write!(f, "unsupported file type: {}", what),
            Error::ExtractionFailed(cause) => write!(f, "extraction failed: {}", cause),
            Error::DuplicateId(id) => write!(f, "document id already exists: {}", id),
            Error::StorageFailure(cause) => write!(f, "storage failure: {}", cause),
        }
    }
}

impl std::error::Error for Error {}

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        Error::StorageFailure(e.to_string())
    }
}
