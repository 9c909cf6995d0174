//! Download of rewritten text as `.txt` or `.docx`.

use std::io::Cursor;

use anyhow::Context;
use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use docx_rs::{Docx, Paragraph, Run};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::routes::extract::AppForm;

pub const EXPORT_BASENAME: &str = "humanized_text";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Txt,
    Docx,
}

impl ExportFormat {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        match raw.trim().to_lowercase().as_str() {
            "txt" => Ok(ExportFormat::Txt),
            "docx" => Ok(ExportFormat::Docx),
            other => Err(AppError::Validation(format!(
                "Unsupported download format '{other}'. Choose txt or docx."
            ))),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Docx => "docx",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Txt => "text/plain; charset=utf-8",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

/// A rendered attachment, ready to send.
#[derive(Debug)]
pub struct ExportedFile {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl IntoResponse for ExportedFile {
    fn into_response(self) -> Response {
        (
            [
                (header::CONTENT_TYPE, self.content_type.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", self.filename),
                ),
            ],
            self.bytes,
        )
            .into_response()
    }
}

pub fn export(text: &str, format: ExportFormat) -> Result<ExportedFile, AppError> {
    let bytes = match format {
        ExportFormat::Txt => text.as_bytes().to_vec(),
        ExportFormat::Docx => build_docx(text)?,
    };

    Ok(ExportedFile {
        filename: format!("{EXPORT_BASENAME}.{}", format.extension()),
        content_type: format.content_type(),
        bytes,
    })
}

/// Word document with one paragraph per input line.
pub fn build_docx(text: &str) -> anyhow::Result<Vec<u8>> {
    let doc = text.lines().fold(Docx::new(), |doc, line| {
        doc.add_paragraph(Paragraph::new().add_run(Run::new().add_text(line)))
    });

    let mut buf = Cursor::new(Vec::new());
    doc.build().pack(&mut buf).context("failed to pack DOCX")?;
    Ok(buf.into_inner())
}

#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    pub text: Option<String>,
    pub format: Option<String>,
}

/// POST /download
pub async fn handle_download(
    AppForm(req): AppForm<DownloadRequest>,
) -> Result<ExportedFile, AppError> {
    let text = req
        .text
        .ok_or_else(|| AppError::Validation("No text to download.".to_string()))?;
    let format = ExportFormat::parse(req.format.as_deref().unwrap_or_default())?;

    let file = export(&text, format)?;
    info!("Exporting {} ({} bytes)", file.filename, file.bytes.len());
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::docx::extract_docx;

    #[test]
    fn test_txt_export_is_raw_utf8() {
        let file = export("Grüße\nzweite Zeile", ExportFormat::Txt).unwrap();
        assert_eq!(file.filename, "humanized_text.txt");
        assert_eq!(file.bytes, "Grüße\nzweite Zeile".as_bytes());
    }

    #[test]
    fn test_docx_export_has_one_paragraph_per_line() {
        let file = export("Line one.\nLine two.\nLine three.", ExportFormat::Docx).unwrap();
        assert_eq!(file.filename, "humanized_text.docx");
        assert!(file.bytes.starts_with(b"PK"));
        assert_eq!(
            extract_docx(&file.bytes).unwrap(),
            "Line one.\nLine two.\nLine three."
        );
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        assert!(matches!(
            ExportFormat::parse("pdf"),
            Err(AppError::Validation(msg)) if msg.contains("pdf")
        ));
        assert_eq!(ExportFormat::parse(" DOCX ").unwrap(), ExportFormat::Docx);
    }

    #[test]
    fn test_attachment_headers() {
        let response = export("hello", ExportFormat::Txt).unwrap().into_response();
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"humanized_text.txt\""
        );
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
    }
}
