use crate::errors::AppError;

pub const MIN_TEXT_CHARS: usize = 10;
pub const MAX_TEXT_CHARS: usize = 10_000;

pub const MISSING_INPUT_MESSAGE: &str = "Please provide text or upload a file.";
pub const NO_CONTENT_MESSAGE: &str =
    "No text content found. Please provide text or upload a valid file.";
pub const TOO_LONG_MESSAGE: &str = "Text exceeds maximum length of 10,000 characters.";
pub const TOO_SHORT_MESSAGE: &str = "Text is too short. Please provide at least 10 characters.";

/// Trims `text` and checks its length in characters. Returns the trimmed text.
pub fn validate_text(text: &str) -> Result<String, AppError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(NO_CONTENT_MESSAGE.to_string()));
    }

    let characters = trimmed.chars().count();
    if characters > MAX_TEXT_CHARS {
        return Err(AppError::Validation(TOO_LONG_MESSAGE.to_string()));
    }
    if characters < MIN_TEXT_CHARS {
        return Err(AppError::Validation(TOO_SHORT_MESSAGE.to_string()));
    }

    Ok(trimmed.to_string())
}
