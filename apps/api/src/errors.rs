use axum::{
    extract::rejection::{FormRejection, JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extraction::ExtractionError;

pub const PAYLOAD_TOO_LARGE_MESSAGE: &str = "File too large. Maximum size is 16MB.";
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred. Please try again.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported file format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Error reading {extension} file: {message}")]
    FileRead { extension: String, message: String },

    #[error("External service error: {0}")]
    ExternalService(#[from] ExternalServiceError),

    #[error("Session expired")]
    SessionExpired,

    #[error("Rate limit exceeded ({window_secs}s window)")]
    RateLimited { window_secs: u64 },

    #[error("Payload too large")]
    PayloadTooLarge,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::UnsupportedFormat { extension } => {
                AppError::UnsupportedFormat { extension }
            }
            ExtractionError::FileRead { extension, message } => {
                AppError::FileRead { extension, message }
            }
            ExtractionError::EmptyDocument { .. } => {
                AppError::Validation("The uploaded file appears to be empty.".to_string())
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        rejected_body(rejection.status(), rejection.body_text())
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        rejected_body(rejection.status(), rejection.body_text())
    }
}

/// Body extractor failures: an over-limit body is a 413, anything else is the caller's fault.
fn rejected_body(status: StatusCode, body_text: String) -> AppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::Validation(format!("Invalid request body: {body_text}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnsupportedFormat { extension } => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_FORMAT",
                format!(
                    "Invalid file type '{extension}'. Please upload TXT, PDF, or DOCX files."
                ),
            ),
            AppError::FileRead { extension, message } => {
                tracing::warn!("File read failure ({extension}): {message}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "FILE_READ_ERROR",
                    format!(
                        "Error reading file: could not read {} file: {message}",
                        extension.trim_start_matches('.').to_uppercase()
                    ),
                )
            }
            AppError::ExternalService(e) => {
                tracing::error!("External service error ({}): {}", e.code(), e.detail());
                (e.status_code(), e.code(), e.user_message())
            }
            AppError::SessionExpired => (
                StatusCode::GONE,
                "SESSION_EXPIRED",
                "Session expired. Please try again.".to_string(),
            ),
            AppError::RateLimited { window_secs } => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                format!("Rate limit exceeded. Please wait {window_secs} seconds between requests."),
            ),
            AppError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                PAYLOAD_TOO_LARGE_MESSAGE.to_string(),
            ),
            AppError::Store(e) => {
                tracing::error!("Store error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_ERROR",
                    INTERNAL_ERROR_MESSAGE.to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    INTERNAL_ERROR_MESSAGE.to_string(),
                )
            }
        };

        error_body(status, code, &message)
    }
}

/// Builds the JSON error envelope shared by handlers and the panic hook.
pub fn error_body(status: StatusCode, code: &str, message: &str) -> Response {
    let body = Json(json!({
        "error": {
            "code": code,
            "message": message
        }
    }));

    (status, body).into_response()
}

/// Failure of the downstream text-generation API, classified by kind.
/// `detail` keeps the raw upstream message for diagnostics; it is never shown to users.
#[derive(Debug, Error)]
pub enum ExternalServiceError {
    #[error("model '{model}' unavailable: {detail}")]
    ModelUnavailable { model: String, detail: String },

    #[error("upstream rate limit: {detail}")]
    RateLimited { detail: String },

    #[error("upstream rejected credentials: {detail}")]
    Unauthorized { detail: String },

    #[error("upstream processing error: {detail}")]
    Generic { detail: String },
}

impl ExternalServiceError {
    pub fn user_message(&self) -> String {
        match self {
            ExternalServiceError::ModelUnavailable { model, .. } => format!(
                "Model '{model}' is currently unavailable. Please try a different model."
            ),
            ExternalServiceError::RateLimited { .. } => {
                "API rate limit exceeded. Please wait a moment and try again.".to_string()
            }
            ExternalServiceError::Unauthorized { .. } => {
                "Invalid API key. Please check your OpenRouter configuration.".to_string()
            }
            ExternalServiceError::Generic { .. } => {
                "AI processing error. Please try again in a moment.".to_string()
            }
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            ExternalServiceError::ModelUnavailable { detail, .. }
            | ExternalServiceError::RateLimited { detail }
            | ExternalServiceError::Unauthorized { detail }
            | ExternalServiceError::Generic { detail } => detail,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ExternalServiceError::ModelUnavailable { .. } => "MODEL_UNAVAILABLE",
            ExternalServiceError::RateLimited { .. } => "UPSTREAM_RATE_LIMITED",
            ExternalServiceError::Unauthorized { .. } => "UPSTREAM_UNAUTHORIZED",
            ExternalServiceError::Generic { .. } => "AI_PROCESSING_ERROR",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ExternalServiceError::ModelUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ExternalServiceError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ExternalServiceError::Unauthorized { .. } | ExternalServiceError::Generic { .. } => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

/// Backing-store failure for job records and rate-limit entries.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
