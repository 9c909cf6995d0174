//! Multipart form decoding shared by the upload endpoints.

use axum::extract::{multipart::MultipartError, Multipart};
use axum::http::StatusCode;

use crate::errors::AppError;
use crate::extraction::UploadedDocument;

/// Fields of the submission form. Every field is optional at this layer.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub input_text: Option<String>,
    pub file: Option<UploadedDocument>,
    pub tone: Option<String>,
    pub intensity: Option<String>,
    pub model: Option<String>,
    pub language: Option<String>,
}

/// Reads all multipart fields. A `file` part with an empty filename counts as no file.
pub async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().trim().to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                if !filename.is_empty() {
                    form.file = Some(UploadedDocument::new(filename, bytes));
                }
            }
            "input_text" | "tone" | "intensity" | "model" | "language" => {
                let value = field.text().await.map_err(multipart_error)?;
                let slot = match name.as_str() {
                    "input_text" => &mut form.input_text,
                    "tone" => &mut form.tone,
                    "intensity" => &mut form.intensity,
                    "model" => &mut form.model,
                    _ => &mut form.language,
                };
                *slot = Some(value);
            }
            other => tracing::debug!("Ignoring unknown form field '{other}'"),
        }
    }

    Ok(form)
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge;
    }
    AppError::Validation(format!("Malformed form submission: {}", e.body_text()))
}
