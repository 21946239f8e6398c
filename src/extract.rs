//! Multi-format text extraction for uploaded documents.
//!
//! Accepts an upload's raw bytes plus its declared content type and returns
//! plain UTF-8 text. Format selection trusts the declared MIME type first
//! and falls back to the filename extension, since declared types are
//! unreliable for some formats. Binary parsing is delegated to
//! collaborators: a lazily initialized [`PdfTextEngine`] for PDF and a
//! zip + XML walk for Word documents.

use std::future::Future;
use std::io::Read;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::error::Error;
use crate::models::FileUpload;

/// Supported MIME types.
pub const MIME_TEXT: &str = "text/plain";
pub const MIME_MARKDOWN: &str = "text/markdown";
pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Maximum decompressed bytes read from a single ZIP entry (zip-bomb
/// protection).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    PlainText,
    Markdown,
    Pdf,
    Docx,
}

/// Resolve the upload's format from its declared content type, falling back
/// to the filename extension as the authority when the type is missing or
/// unrecognized.
fn detect_format(content_type: &str, name: &str) -> Option<Format> {
    match content_type {
        MIME_TEXT => return Some(Format::PlainText),
        MIME_MARKDOWN => return Some(Format::Markdown),
        MIME_PDF => return Some(Format::Pdf),
        MIME_DOCX => return Some(Format::Docx),
        _ => {}
    }
    let name = name.to_lowercase();
    if name.ends_with(".txt") {
        Some(Format::PlainText)
    } else if name.ends_with(".md") || name.ends_with(".markdown") {
        Some(Format::Markdown)
    } else if name.ends_with(".pdf") {
        Some(Format::Pdf)
    } else if name.ends_with(".docx") {
        Some(Format::Docx)
    } else {
        None
    }
}

/// Best-effort content type from a filename, for callers (like the CLI)
/// that have no declared MIME type. Returns an empty string when unknown.
pub fn guess_content_type(name: &str) -> &'static str {
    match detect_format("", name) {
        Some(Format::PlainText) => MIME_TEXT,
        Some(Format::Markdown) => MIME_MARKDOWN,
        Some(Format::Pdf) => MIME_PDF,
        Some(Format::Docx) => MIME_DOCX,
        None => "",
    }
}

/// PDF text-layer extraction collaborator.
///
/// Implementations return the concatenated text content of every page,
/// separated by blank lines.
#[async_trait]
pub trait PdfTextEngine: Send + Sync {
    async fn extract_text(&self, bytes: &[u8]) -> Result<String, Error>;
}

/// Default engine backed by the `pdf-extract` crate.
pub struct PdfExtractEngine;

#[async_trait]
impl PdfTextEngine for PdfExtractEngine {
    async fn extract_text(&self, bytes: &[u8]) -> Result<String, Error> {
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
            Error::ExtractionFailed(format!(
                "PDF parsing failed: {}; if the file is encrypted or image-only, \
                 try converting it to plain text",
                e
            ))
        })
    }
}

type BoxedEngine = Arc<dyn PdfTextEngine>;
type EngineFuture = Pin<Box<dyn Future<Output = Result<BoxedEngine, Error>> + Send>>;
type EngineLoader = Box<dyn Fn() -> EngineFuture + Send + Sync>;

/// Lazily initialized PDF engine with single-flight semantics.
///
/// The first caller runs the loader; concurrent callers await the same
/// in-flight initialization; the engine is never loaded twice. A failed
/// load leaves the cell empty so a later call can retry.
pub struct LazyPdfEngine {
    cell: OnceCell<BoxedEngine>,
    loader: EngineLoader,
}

impl LazyPdfEngine {
    pub fn new<F, Fut>(loader: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<BoxedEngine, Error>> + Send + 'static,
    {
        Self {
            cell: OnceCell::new(),
            loader: Box::new(move || Box::pin(loader())),
        }
    }

    /// Engine resolving to the bundled `pdf-extract` backend.
    pub fn bundled() -> Self {
        Self::new(|| async { Ok(Arc::new(PdfExtractEngine) as BoxedEngine) })
    }

    async fn get(&self) -> Result<&BoxedEngine, Error> {
        self.cell.get_or_try_init(|| (self.loader)()).await
    }
}

/// Multi-format text extractor.
pub struct Extractor {
    pdf: LazyPdfEngine,
}

impl Extractor {
    pub fn new() -> Self {
        Self {
            pdf: LazyPdfEngine::bundled(),
        }
    }

    /// Build an extractor around a custom PDF engine, e.g. a test double or
    /// an externally loaded renderer.
    pub fn with_pdf_engine(pdf: LazyPdfEngine) -> Self {
        Self { pdf }
    }

    /// Extract plain text from an upload.
    ///
    /// Fails with [`Error::UnsupportedFormat`] when neither the declared
    /// content type nor the filename extension matches a supported format,
    /// and with [`Error::ExtractionFailed`] when a format parser fails or
    /// the result is empty or whitespace-only.
    pub async fn extract(&self, file: &FileUpload) -> Result<String, Error> {
        let format = detect_format(&file.content_type, &file.name).ok_or_else(|| {
            let declared = if file.content_type.is_empty() {
                "no declared type"
            } else {
                file.content_type.as_str()
            };
            Error::UnsupportedFormat(format!("{} ({})", file.name, declared))
        })?;

        let text = match format {
            Format::PlainText | Format::Markdown => {
                String::from_utf8_lossy(&file.bytes).into_owned()
            }
            Format::Pdf => {
                let engine = self.pdf.get().await?;
                engine.extract_text(&file.bytes).await?
            }
            Format::Docx => extract_docx(&file.bytes)?,
        };

        if text.trim().is_empty() {
            return Err(Error::ExtractionFailed(format!(
                "{} contains no extractable text; try converting it to plain text",
                file.name
            )));
        }
        Ok(text)
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Raw text from a .docx: unzip, then collect the `<w:t>` runs of
/// `word/document.xml`, one line break per paragraph. No formatting,
/// images, or table structure survives.
fn extract_docx(bytes: &[u8]) -> Result<String, Error> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| Error::ExtractionFailed(format!("not a valid .docx archive: {}", e)))?;

    let mut doc_xml = Vec::new();
    {
        let entry = archive.by_name("word/document.xml").map_err(|e| {
            Error::ExtractionFailed(format!("word/document.xml not found: {}", e))
        })?;
        entry
            .take(MAX_XML_ENTRY_BYTES)
            .read_to_end(&mut doc_xml)
            .map_err(|e| Error::ExtractionFailed(e.to_string()))?;
        if doc_xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
            return Err(Error::ExtractionFailed(
                "word/document.xml exceeds size limit".to_string(),
            ));
        }
    }

    collect_text_runs(&doc_xml)
}

fn collect_text_runs(xml: &[u8]) -> Result<String, Error> {
    let mut out = String::new();
    let mut reader = quick_xml::Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    if let Ok(quick_xml::events::Event::Text(te)) = reader.read_event_into(&mut buf)
                    {
                        out.push_str(te.unescape().unwrap_or_default().as_ref());
                    }
                }
            }
            Ok(quick_xml::events::Event::End(e)) => {
                // Paragraph ends become blank lines so the chunker sees the
                // same boundaries a plain-text upload would carry.
                if e.local_name().as_ref() == b"p" && !out.is_empty() {
                    out.push_str("\n\n");
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(Error::ExtractionFailed(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(out)
}
