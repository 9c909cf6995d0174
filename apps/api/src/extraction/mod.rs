//! File extraction — turns an uploaded `.txt`, `.pdf` or `.docx` into plain text.
//!
//! Extraction is synchronous and CPU-bound; async callers run it through
//! `extract_blocking`.

use std::path::Path;

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

pub mod docx;
pub mod handlers;
pub mod pdf;
pub mod text;

/// Extensions accepted for upload, lower-cased with leading dot.
pub const ACCEPTED_EXTENSIONS: &[&str] = &[".txt", ".pdf", ".docx"];

/// A file as received from the client. Lives for a single request.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: String,
    pub bytes: Bytes,
}

impl UploadedDocument {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    /// Lower-cased extension with leading dot, or an empty string.
    pub fn extension(&self) -> String {
        Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
            .unwrap_or_default()
    }

    pub fn is_accepted(&self) -> bool {
        ACCEPTED_EXTENSIONS.contains(&self.extension().as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ExtractionError {
    #[error("Unsupported file format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Error reading {extension} file: {message}")]
    FileRead { extension: String, message: String },

    #[error("Document appears to be empty ({extension})")]
    EmptyDocument { extension: String },
}

pub type ExtractionResult = Result<String, ExtractionError>;

/// Extracts plain text from an uploaded document, dispatching on its extension.
pub fn extract(document: &UploadedDocument) -> ExtractionResult {
    let extension = document.extension();
    debug!(
        "Extracting {} ({} bytes, {})",
        document.filename,
        document.bytes.len(),
        if extension.is_empty() { "no extension" } else { extension.as_str() }
    );

    let result = match extension.as_str() {
        ".txt" => Ok(text::decode(&document.bytes)),
        ".pdf" => pdf::extract_pdf(&document.bytes),
        ".docx" => docx::extract_docx(&document.bytes),
        _ => {
            return Err(ExtractionError::UnsupportedFormat { extension });
        }
    };

    result.map_err(|message| ExtractionError::FileRead {
        extension: extension.clone(),
        message,
    })
}

/// Runs `extract` on the blocking pool.
pub async fn extract_blocking(document: UploadedDocument) -> anyhow::Result<ExtractionResult> {
    let result = tokio::task::spawn_blocking(move || extract(&document)).await?;
    Ok(result)
}

/// Rejects whitespace-only extraction output.
pub fn require_content(extension: &str, text: String) -> ExtractionResult {
    if text.trim().is_empty() {
        return Err(ExtractionError::EmptyDocument {
            extension: extension.to_string(),
        });
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_is_lowercased_with_dot() {
        let doc = UploadedDocument::new("Report.PDF", Vec::new());
        assert_eq!(doc.extension(), ".pdf");
        assert!(doc.is_accepted());
    }

    #[test]
    fn test_missing_extension_is_empty() {
        let doc = UploadedDocument::new("README", Vec::new());
        assert_eq!(doc.extension(), "");
        assert!(!doc.is_accepted());
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        let doc = UploadedDocument::new("notes.xyz", b"hello".to_vec());
        let err = extract(&doc).unwrap_err();
        assert_eq!(
            err,
            ExtractionError::UnsupportedFormat {
                extension: ".xyz".to_string()
            }
        );
        assert!(err.to_string().contains(".xyz"));
    }

    #[test]
    fn test_empty_txt_is_empty_text_not_failure() {
        let doc = UploadedDocument::new("empty.txt", Vec::new());
        assert_eq!(extract(&doc), Ok(String::new()));
    }

    #[test]
    fn test_txt_is_returned_verbatim() {
        let doc = UploadedDocument::new("a.txt", "  line one\nline two  ".as_bytes().to_vec());
        assert_eq!(extract(&doc).unwrap(), "  line one\nline two  ");
    }

    #[test]
    fn test_corrupt_pdf_is_file_read_error_with_extension() {
        let doc = UploadedDocument::new("broken.pdf", b"%PDF-1.4 this is not a pdf".to_vec());
        match extract(&doc) {
            Err(ExtractionError::FileRead { extension, message }) => {
                assert_eq!(extension, ".pdf");
                assert!(!message.is_empty());
            }
            other => panic!("expected FileRead, got {other:?}"),
        }
    }

    #[test]
    fn test_corrupt_docx_is_file_read_error_with_extension() {
        let doc = UploadedDocument::new("broken.docx", b"not a zip archive".to_vec());
        assert!(matches!(
            extract(&doc),
            Err(ExtractionError::FileRead { extension, .. }) if extension == ".docx"
        ));
    }

    #[test]
    fn test_require_content_rejects_whitespace() {
        assert_eq!(
            require_content(".txt", " \n\t ".to_string()),
            Err(ExtractionError::EmptyDocument {
                extension: ".txt".to_string()
            })
        );
        assert_eq!(require_content(".txt", "x".to_string()), Ok("x".to_string()));
    }

    #[tokio::test]
    async fn test_extract_blocking_runs_off_runtime() {
        let doc = UploadedDocument::new("a.txt", b"hello world".to_vec());
        let result = extract_blocking(doc).await.unwrap();
        assert_eq!(result, Ok("hello world".to_string()));
    }
}
