//! Rewrite request construction, dispatch and upstream error classification.

use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::ExternalServiceError;
use crate::humanize::options::{ModelId, RewriteOptions};
use crate::humanize::prompts::build_user_prompt;
use crate::llm_client::prompts::HUMANIZER_SYSTEM;
use crate::llm_client::{ChatCompletion, ChatMessage, ChatRequest, LlmError};

pub const TOP_P: f32 = 0.9;
pub const MAX_OUTPUT_TOKENS: u32 = 2048;

/// Builds rewrite prompts and sends them through the configured `ChatCompletion` backend.
#[derive(Clone)]
pub struct Rewriter {
    llm: Arc<dyn ChatCompletion>,
}

impl Rewriter {
    pub fn new(llm: Arc<dyn ChatCompletion>) -> Self {
        Self { llm }
    }

    /// Rewrites `text` with one upstream call. No retry.
    pub async fn rewrite(
        &self,
        text: &str,
        options: &RewriteOptions,
    ) -> Result<String, ExternalServiceError> {
        let request = build_request(text, options);
        info!(
            "Rewriting {} chars: model={}, language={}, intensity={}",
            text.chars().count(),
            request.model,
            options.language.code(),
            options.intensity.as_str()
        );

        let raw = self
            .llm
            .complete(&request)
            .await
            .map_err(|e| classify_failure(e, options.model))?;

        Ok(clean_output(&raw))
    }
}

/// Chat request for a rewrite. The model is always one of the supported ids.
pub fn build_request(text: &str, options: &RewriteOptions) -> ChatRequest {
    let user_prompt = build_user_prompt(
        options.language,
        &options.tone,
        options.intensity.as_str(),
        text,
    );

    ChatRequest {
        model: options.model.id().to_string(),
        messages: vec![
            ChatMessage::system(HUMANIZER_SYSTEM),
            ChatMessage::user(user_prompt),
        ],
        temperature: options.intensity.temperature(),
        top_p: TOP_P,
        max_tokens: MAX_OUTPUT_TOKENS,
    }
}

/// Trims model output and drops lines that are only a code-fence marker
/// (```` ``` ```` optionally followed by a language tag).
pub fn clean_output(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.contains("```") {
        return trimmed.to_string();
    }

    trimmed
        .lines()
        .filter(|line| !is_fence_line(line))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn is_fence_line(line: &str) -> bool {
    line.trim()
        .strip_prefix("```")
        .is_some_and(|tag| !tag.contains(char::is_whitespace))
}

/// Maps an upstream failure onto the four user-facing kinds.
pub fn classify_failure(err: LlmError, model: ModelId) -> ExternalServiceError {
    let detail = err.to_string();
    warn!("Rewrite failed on {}: {detail}", model.id());

    match err.status() {
        Some(404) => ExternalServiceError::ModelUnavailable {
            model: model.id().to_string(),
            detail,
        },
        Some(429) => ExternalServiceError::RateLimited { detail },
        Some(401) => ExternalServiceError::Unauthorized { detail },
        _ => ExternalServiceError::Generic { detail },
    }
}
