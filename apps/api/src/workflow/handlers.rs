use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Multipart, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::ACCEPTED_EXTENSIONS;
use crate::humanize::options::{OptionInfo, DEFAULT_TONE, SUGGESTED_TONES};
use crate::humanize::{Intensity, Language, ModelId, RewriteOptions};
use crate::routes::extract::AppJson;
use crate::routes::form::read_upload_form;
use crate::state::AppState;
use crate::workflow::jobs::JobState;
use crate::workflow::orchestrator::{RewriteReport, Submission, SubmissionReceipt};
use crate::workflow::validation::{MAX_TEXT_CHARS, MIN_TEXT_CHARS};

/// Everything a client needs to render the submission form.
#[derive(Debug, Serialize)]
pub struct FormMetadata {
    pub state: JobState,
    pub models: Vec<OptionInfo>,
    pub default_model: &'static str,
    pub languages: Vec<OptionInfo>,
    pub intensities: Vec<Intensity>,
    pub suggested_tones: &'static [&'static str],
    pub default_tone: &'static str,
    pub min_characters: usize,
    pub max_characters: usize,
    pub accepted_extensions: &'static [&'static str],
    pub rate_limit_window_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    pub job_token: Uuid,
}

/// GET /
pub async fn handle_form_metadata(State(state): State<AppState>) -> Json<FormMetadata> {
    Json(FormMetadata {
        state: JobState::AwaitingInput,
        models: ModelId::ALL.into_iter().map(ModelId::info).collect(),
        default_model: ModelId::default().id(),
        languages: Language::ALL.into_iter().map(Language::info).collect(),
        intensities: Intensity::ALL.to_vec(),
        suggested_tones: SUGGESTED_TONES,
        default_tone: DEFAULT_TONE,
        min_characters: MIN_TEXT_CHARS,
        max_characters: MAX_TEXT_CHARS,
        accepted_extensions: ACCEPTED_EXTENSIONS,
        rate_limit_window_secs: state.config.rate_limit_window_secs,
    })
}

/// POST /
pub async fn handle_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    peer: Option<ConnectInfo<SocketAddr>>,
    multipart: Multipart,
) -> Result<Json<SubmissionReceipt>, AppError> {
    let client = client_key(
        &headers,
        peer.map(|ConnectInfo(addr)| addr),
        state.config.trust_forwarded_for,
    );
    let form = read_upload_form(multipart).await?;

    let options = RewriteOptions::from_raw(
        form.tone.as_deref(),
        form.intensity.as_deref(),
        form.model.as_deref(),
        form.language.as_deref(),
    );
    let submission = Submission {
        input_text: form.input_text,
        file: form.file,
        options,
    };

    let receipt = state.orchestrator.submit(&client, submission).await?;
    Ok(Json(receipt))
}

/// POST /process
pub async fn handle_process(
    State(state): State<AppState>,
    AppJson(req): AppJson<ProcessRequest>,
) -> Result<Json<RewriteReport>, AppError> {
    let report = state.orchestrator.process(req.job_token).await?;
    Ok(Json(report))
}

/// Rate-limit key: the peer IP. The first `X-Forwarded-For` entry wins only when
/// the deployment trusts its proxy to set that header.
pub fn client_key(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_forwarded_for: bool,
) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .filter(|_| trust_forwarded_for)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    match (forwarded, peer) {
        (Some(ip), _) => ip.to_string(),
        (None, Some(addr)) => addr.ip().to_string(),
        (None, None) => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn forwarded(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_client_key_ignores_forwarded_header_by_default() {
        let peer: SocketAddr = "127.0.0.1:5000".parse().unwrap();
        let headers = forwarded("203.0.113.9, 10.0.0.2");
        assert_eq!(client_key(&headers, Some(peer), false), "127.0.0.1");
        assert_eq!(client_key(&headers, None, false), "unknown");
    }

    #[test]
    fn test_client_key_uses_first_forwarded_entry_when_trusted() {
        let peer: SocketAddr = "127.0.0.1:5000".parse().unwrap();
        let headers = forwarded("203.0.113.9, 10.0.0.2");
        assert_eq!(client_key(&headers, Some(peer), true), "203.0.113.9");
    }

    #[test]
    fn test_client_key_falls_back_to_peer_ip() {
        let peer: SocketAddr = "192.0.2.7:41000".parse().unwrap();
        assert_eq!(client_key(&HeaderMap::new(), Some(peer), true), "192.0.2.7");
        assert_eq!(client_key(&forwarded(" "), Some(peer), true), "192.0.2.7");
        assert_eq!(client_key(&HeaderMap::new(), None, true), "unknown");
    }

    #[test]
    fn test_process_request_requires_uuid() {
        assert!(serde_json::from_str::<ProcessRequest>(r#"{"job_token":"nope"}"#).is_err());
        let token = Uuid::new_v4();
        let req: ProcessRequest =
            serde_json::from_value(serde_json::json!({ "job_token": token })).unwrap();
        assert_eq!(req.job_token, token);
    }
}
