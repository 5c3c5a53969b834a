//! Text Extractor: turns uploaded bytes (plain text, PDF, DOCX) or pasted text
//! into canonical UTF-8 text.
//!
//! Binary parsing runs on the blocking pool under a wall-clock budget. A parser
//! that panics or overruns surfaces as `ExtractionError::Failed`, never as an
//! empty resume. A semaphore caps how many parses run at once, and a parse keeps
//! its slot until the thread finishes, including after a timeout.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use docx_rs::{DocumentChild, ParagraphChild, RunChild};
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Hard ceiling for a single upload or pasted text, in bytes (16 MiB).
pub const MAX_INPUT_BYTES: usize = 16 * 1024 * 1024;

pub const MIME_PLAIN_TEXT: &str = "text/plain";
pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("File is too large ({size} bytes); the limit is {limit} bytes")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("File type not allowed ({0}). Use txt, pdf, or docx")]
    UnsupportedFormat(String),

    #[error("Could not read document: {0}")]
    Failed(String),

    #[error("Too many documents are being processed; try again shortly")]
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    PlainText,
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Resolves the format from the declared content type, falling back to the
    /// file extension when the type is missing or generic.
    pub fn detect(content_type: Option<&str>, filename: &str) -> Result<Self, ExtractionError> {
        let mime = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase())
            .filter(|ct| !ct.is_empty() && ct != "application/octet-stream");

        match mime.as_deref() {
            Some(MIME_PLAIN_TEXT) => Ok(DocumentFormat::PlainText),
            Some(MIME_PDF) => Ok(DocumentFormat::Pdf),
            Some(MIME_DOCX) => Ok(DocumentFormat::Docx),
            Some(other) => Err(ExtractionError::UnsupportedFormat(other.to_string())),
            None => Self::from_extension(filename),
        }
    }

    fn from_extension(filename: &str) -> Result<Self, ExtractionError> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("txt") => Ok(DocumentFormat::PlainText),
            Some("pdf") => Ok(DocumentFormat::Pdf),
            Some("docx") => Ok(DocumentFormat::Docx),
            _ => Err(ExtractionError::UnsupportedFormat(format!(
                "unrecognized file '{filename}'"
            ))),
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            DocumentFormat::PlainText => MIME_PLAIN_TEXT,
            DocumentFormat::Pdf => MIME_PDF,
            DocumentFormat::Docx => MIME_DOCX,
        }
    }
}

pub fn check_size(size: usize) -> Result<(), ExtractionError> {
    if size > MAX_INPUT_BYTES {
        return Err(ExtractionError::PayloadTooLarge {
            size,
            limit: MAX_INPUT_BYTES,
        });
    }
    Ok(())
}

/// Extracts canonical text from an uploaded document.
///
/// Waits up to `budget` for one of `parse_slots`, then gives the parse itself
/// the same budget.
pub async fn extract_text(
    data: Bytes,
    format: DocumentFormat,
    budget: Duration,
    parse_slots: Arc<Semaphore>,
) -> Result<String, ExtractionError> {
    check_size(data.len())?;

    let size = data.len();
    let permit = match tokio::time::timeout(budget, parse_slots.acquire_owned()).await {
        Ok(Ok(permit)) => permit,
        Ok(Err(_closed)) => return Err(ExtractionError::Busy),
        Err(_) => {
            warn!(?format, size, "No parse slot freed up within {budget:?}");
            return Err(ExtractionError::Busy);
        }
    };

    let task = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        parse_document(&data, format)
    });

    let raw = match tokio::time::timeout(budget, task).await {
        Err(_) => {
            warn!(?format, size, "Document parsing exceeded {budget:?}");
            return Err(ExtractionError::Failed(format!(
                "parsing took longer than {} seconds",
                budget.as_secs()
            )));
        }
        Ok(Err(join_err)) => {
            warn!(?format, size, "Document parser aborted: {join_err}");
            return Err(ExtractionError::Failed(
                "the document appears to be corrupt".to_string(),
            ));
        }
        Ok(Ok(result)) => result?,
    };

    let text = canonicalize(&raw);
    if text.is_empty() {
        return Err(ExtractionError::Failed(
            "no text could be extracted".to_string(),
        ));
    }

    debug!(?format, size, chars = text.len(), "Extracted document text");
    Ok(text)
}

fn parse_document(data: &[u8], format: DocumentFormat) -> Result<String, ExtractionError> {
    match format {
        DocumentFormat::PlainText => std::str::from_utf8(data)
            .map(str::to_string)
            .map_err(|e| ExtractionError::Failed(format!("text is not valid UTF-8: {e}"))),
        DocumentFormat::Pdf => pdf_extract::extract_text_from_mem(data)
            .map_err(|e| ExtractionError::Failed(format!("invalid PDF: {e}"))),
        DocumentFormat::Docx => extract_docx(data),
    }
}

fn extract_docx(data: &[u8]) -> Result<String, ExtractionError> {
    let docx = docx_rs::read_docx(data)
        .map_err(|e| ExtractionError::Failed(format!("invalid DOCX: {e}")))?;

    let mut text = String::new();
    for child in &docx.document.children {
        if let DocumentChild::Paragraph(paragraph) = child {
            for paragraph_child in &paragraph.children {
                if let ParagraphChild::Run(run) = paragraph_child {
                    for run_child in &run.children {
                        match run_child {
                            RunChild::Text(t) => text.push_str(&t.text),
                            RunChild::Tab(_) => text.push('\t'),
                            RunChild::Break(_) => text.push('\n'),
                            _ => {}
                        }
                    }
                }
            }
            text.push('\n');
        }
    }
    Ok(text)
}

/// Normalizes line endings and strips BOM/NUL characters. Content is otherwise untouched.
pub fn canonicalize(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}')
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\0', "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUDGET: Duration = Duration::from_secs(5);

    fn slots() -> Arc<Semaphore> {
        Arc::new(Semaphore::new(2))
    }

    fn docx_bytes(paragraphs: &[&str]) -> Bytes {
        use docx_rs::{Docx, Paragraph, Run};

        let docx = paragraphs.iter().fold(Docx::new(), |docx, text| {
            docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*text)))
        });
        let mut buffer = std::io::Cursor::new(Vec::new());
        docx.build().pack(&mut buffer).unwrap();
        Bytes::from(buffer.into_inner())
    }

    #[test]
    fn test_detect_by_content_type() {
        assert_eq!(
            DocumentFormat::detect(Some("text/plain; charset=utf-8"), "x").unwrap(),
            DocumentFormat::PlainText
        );
        assert_eq!(
            DocumentFormat::detect(Some("application/pdf"), "resume").unwrap(),
            DocumentFormat::Pdf
        );
        assert_eq!(
            DocumentFormat::detect(Some(MIME_DOCX), "resume").unwrap(),
            DocumentFormat::Docx
        );
    }

    #[test]
    fn test_detect_falls_back_to_extension() {
        assert_eq!(
            DocumentFormat::detect(Some("application/octet-stream"), "CV.PDF").unwrap(),
            DocumentFormat::Pdf
        );
        assert_eq!(
            DocumentFormat::detect(None, "cv.docx").unwrap(),
            DocumentFormat::Docx
        );
        assert_eq!(
            DocumentFormat::detect(None, "notes.txt").unwrap(),
            DocumentFormat::PlainText
        );
    }

    #[test]
    fn test_detect_rejects_other_types() {
        assert!(matches!(
            DocumentFormat::detect(Some("image/png"), "photo.png"),
            Err(ExtractionError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            DocumentFormat::detect(Some("application/msword"), "old.doc"),
            Err(ExtractionError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            DocumentFormat::detect(None, "README"),
            Err(ExtractionError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_size_limit_is_16_mib() {
        assert!(check_size(MAX_INPUT_BYTES).is_ok());
        assert!(matches!(
            check_size(MAX_INPUT_BYTES + 1),
            Err(ExtractionError::PayloadTooLarge { .. })
        ));
    }

    #[test]
    fn test_canonicalize_normalizes_line_endings() {
        let raw = "\u{feff}  Jane Doe\r\nEngineer\rRust\0 \n";
        assert_eq!(canonicalize(raw), "Jane Doe\nEngineer\nRust");
    }

    #[tokio::test]
    async fn test_plain_text_extraction() {
        let text = extract_text(
            Bytes::from_static(b"Jane Doe\r\nPython developer\r\n"),
            DocumentFormat::PlainText,
            BUDGET,
            slots(),
        )
        .await
        .unwrap();
        assert_eq!(text, "Jane Doe\nPython developer");
    }

    #[tokio::test]
    async fn test_invalid_utf8_fails() {
        let err = extract_text(
            Bytes::from_static(&[0xff, 0xfe, 0xfd]),
            DocumentFormat::PlainText,
            BUDGET,
            slots(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ExtractionError::Failed(_)));
    }

    #[tokio::test]
    async fn test_whitespace_only_document_fails() {
        let err = extract_text(
            Bytes::from_static(b" \n\t "),
            DocumentFormat::PlainText,
            BUDGET,
            slots(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ExtractionError::Failed(_)));
    }

    #[tokio::test]
    async fn test_corrupt_pdf_fails() {
        let err = extract_text(
            Bytes::from_static(b"%PDF-1.4 this is not really a pdf"),
            DocumentFormat::Pdf,
            BUDGET,
            slots(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ExtractionError::Failed(_)));
    }

    #[tokio::test]
    async fn test_corrupt_docx_fails() {
        let err = extract_text(
            Bytes::from_static(b"PK\x03\x04 truncated zip"),
            DocumentFormat::Docx,
            BUDGET,
            slots(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ExtractionError::Failed(_)));
    }

    #[tokio::test]
    async fn test_oversized_upload_rejected_before_parsing() {
        let data = Bytes::from(vec![b'a'; MAX_INPUT_BYTES + 1]);
        let err = extract_text(data, DocumentFormat::PlainText, BUDGET, slots())
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::PayloadTooLarge { .. }));
    }

    #[tokio::test]
    async fn test_docx_paragraphs_become_lines() {
        let data = docx_bytes(&["Jane Doe jane@example.com", "5 years of Python"]);
        let text = extract_text(data, DocumentFormat::Docx, BUDGET, slots())
            .await
            .unwrap();
        assert_eq!(text, "Jane Doe jane@example.com\n5 years of Python");
    }

    #[tokio::test]
    async fn test_busy_when_no_parse_slot_frees_up() {
        let err = extract_text(
            Bytes::from_static(b"Jane Doe"),
            DocumentFormat::PlainText,
            Duration::from_millis(50),
            Arc::new(Semaphore::new(0)),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ExtractionError::Busy));
    }

    #[tokio::test]
    async fn test_parse_slot_is_released_after_parsing() {
        let parse_slots = Arc::new(Semaphore::new(1));
        for _ in 0..2 {
            let text = extract_text(
                Bytes::from_static(b"Jane Doe"),
                DocumentFormat::PlainText,
                BUDGET,
                parse_slots.clone(),
            )
            .await
            .unwrap();
            assert_eq!(text, "Jane Doe");
        }
        assert_eq!(parse_slots.available_permits(), 1);
    }
}
