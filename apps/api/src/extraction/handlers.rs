//! Axum route handler for standalone text extraction.

use axum::{extract::Multipart, Json};
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::extraction::{extract_blocking, require_content, UploadedDocument};
use crate::routes::form::read_upload_form;

#[derive(Debug, Serialize, PartialEq)]
pub struct ExtractTextResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub characters: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractTextResponse {
    fn ok(text: String) -> Self {
        Self {
            success: true,
            characters: Some(text.chars().count()),
            text: Some(text),
            error: None,
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            text: None,
            characters: None,
            error: Some(error.into()),
        }
    }
}

/// POST /extract-text
///
/// Always answers 200; failures are reported in the body as `{success: false, error}`.
pub async fn handle_extract_text(multipart: Multipart) -> Json<ExtractTextResponse> {
    let form = match read_upload_form(multipart).await {
        Ok(form) => form,
        Err(AppError::PayloadTooLarge) => {
            return Json(ExtractTextResponse::failed(
                crate::errors::PAYLOAD_TOO_LARGE_MESSAGE,
            ))
        }
        Err(e) => return Json(ExtractTextResponse::failed(format!("Server error: {e}"))),
    };

    let Some(document) = form.file else {
        return Json(ExtractTextResponse::failed("No file provided"));
    };

    Json(extract_for_preview(document).await)
}

async fn extract_for_preview(document: UploadedDocument) -> ExtractTextResponse {
    let filename = document.filename.clone();
    let extension = document.extension();
    info!("Extracting text from {filename}");

    let result = match extract_blocking(document).await {
        Ok(result) => result,
        Err(e) => return ExtractTextResponse::failed(format!("Server error: {e}")),
    };

    match result.and_then(|text| require_content(&extension, text)) {
        Ok(text) => {
            info!("Extracted {} characters from {filename}", text.chars().count());
            ExtractTextResponse::ok(text)
        }
        Err(e) => {
            warn!("Extraction failed for {filename}: {e}");
            ExtractTextResponse::failed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_preview_counts_characters() {
        let doc = UploadedDocument::new("a.txt", "héllo wörld".as_bytes().to_vec());
        let response = extract_for_preview(doc).await;
        assert!(response.success);
        assert_eq!(response.characters, Some(11));
        assert_eq!(response.text.as_deref(), Some("héllo wörld"));
    }

    #[tokio::test]
    async fn test_preview_reports_unsupported_format() {
        let doc = UploadedDocument::new("a.xyz", b"data".to_vec());
        let response = extract_for_preview(doc).await;
        assert!(!response.success);
        assert!(response.error.unwrap().contains(".xyz"));
    }

    #[tokio::test]
    async fn test_preview_reports_empty_document() {
        let doc = UploadedDocument::new("blank.txt", b"   \n".to_vec());
        let response = extract_for_preview(doc).await;
        assert!(!response.success);
        assert!(response.error.unwrap().contains("empty"));
    }

    #[test]
    fn test_failure_omits_text_fields_in_json() {
        let json = serde_json::to_value(ExtractTextResponse::failed("No file provided")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": false, "error": "No file provided"})
        );
    }
}
