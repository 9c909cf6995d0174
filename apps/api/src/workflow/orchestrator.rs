//! Humanization workflow — sequences the two request steps.
//!
//! Flow: submit → rate limit → resolve text (file wins over typed text) →
//!       validate → store job (Validated)
//!       process → claim job (Rewriting) → rewrite → score → clear job (Done)
//!
//! A failed rewrite clears the job before the error is surfaced, so a retry
//! always starts from a fresh submission. A claimed job is also released if
//! `process` unwinds or is dropped before it finishes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::{extract_blocking, require_content, UploadedDocument};
use crate::humanize::options::OptionInfo;
use crate::humanize::{Intensity, RewriteOptions, Rewriter};
use crate::scoring::{score_rewrite, RewriteScores, RngNoise};
use crate::workflow::clock::Clock;
use crate::workflow::jobs::{Claim, JobRecord, JobState, JobStore};
use crate::workflow::rate_limit::RateLimiter;
use crate::workflow::validation::{validate_text, MISSING_INPUT_MESSAGE};

pub const JOB_BUSY_MESSAGE: &str = "This request is already being processed.";

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Raw user input for one submission.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub input_text: Option<String>,
    pub file: Option<UploadedDocument>,
    pub options: RewriteOptions,
}

/// Returned by `submit`; the token is needed for `process`.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReceipt {
    pub job_token: Uuid,
    pub state: JobState,
    pub characters: usize,
    pub expires_at: DateTime<Utc>,
}

/// Everything the result view shows for a completed rewrite.
#[derive(Debug, Clone, Serialize)]
pub struct RewriteReport {
    pub original: String,
    pub rewritten: String,
    pub ai_likelihood_before: f64,
    pub ai_likelihood_after: f64,
    pub readability: f64,
    pub tone: String,
    pub intensity: Intensity,
    pub model: OptionInfo,
    pub language: OptionInfo,
}

impl RewriteReport {
    fn new(job: JobRecord, rewritten: String, scores: RewriteScores) -> Self {
        Self {
            ai_likelihood_before: scores.before.ai_likelihood,
            ai_likelihood_after: scores.after.ai_likelihood,
            readability: scores.after.readability,
            tone: job.options.tone,
            intensity: job.options.intensity,
            model: job.options.model.info(),
            language: job.options.language.info(),
            original: job.text,
            rewritten,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ────────────────────────────────────────────────────────────────────────────

pub struct Orchestrator {
    rate_limiter: RateLimiter,
    jobs: Arc<dyn JobStore>,
    rewriter: Rewriter,
    clock: Arc<dyn Clock>,
    job_ttl: chrono::Duration,
}

impl Orchestrator {
    pub fn new(
        rate_limiter: RateLimiter,
        jobs: Arc<dyn JobStore>,
        rewriter: Rewriter,
        clock: Arc<dyn Clock>,
        job_ttl: std::time::Duration,
    ) -> Self {
        Self {
            rate_limiter,
            jobs,
            rewriter,
            clock,
            job_ttl: chrono::Duration::from_std(job_ttl)
                .unwrap_or_else(|_| chrono::Duration::days(1)),
        }
    }

    /// Validates a submission and stores it as a job awaiting processing.
    pub async fn submit(
        &self,
        client_key: &str,
        submission: Submission,
    ) -> Result<SubmissionReceipt, AppError> {
        self.rate_limiter.check_and_record(client_key).await?;

        let text = resolve_text(submission.input_text, submission.file).await?;
        let text = validate_text(&text)?;

        let job = JobRecord::validated(text, submission.options, self.clock.now(), self.job_ttl);
        self.jobs.insert(&job).await?;

        let characters = job.text.chars().count();
        info!(
            "Job {} validated: {} characters, model={}, language={}",
            job.token,
            characters,
            job.options.model.id(),
            job.options.language.code()
        );

        Ok(SubmissionReceipt {
            job_token: job.token,
            state: job.state,
            characters,
            expires_at: job.expires_at,
        })
    }

    /// Rewrites a validated job and scores the result. The job is consumed
    /// whether the rewrite succeeds or fails.
    pub async fn process(&self, token: Uuid) -> Result<RewriteReport, AppError> {
        let job = match self.jobs.claim(token).await? {
            Claim::Claimed(job) => job,
            Claim::Busy => return Err(AppError::Validation(JOB_BUSY_MESSAGE.to_string())),
            Claim::Missing => return Err(AppError::SessionExpired),
        };

        let claim = ClaimGuard::new(self.jobs.clone(), token);

        let rewritten = match self.rewriter.rewrite(&job.text, &job.options).await {
            Ok(text) => text,
            Err(e) => {
                self.finish(token, JobState::Failed).await;
                claim.disarm();
                return Err(e.into());
            }
        };

        let scores = score_with_thread_rng(&job.text, &rewritten);
        self.finish(token, JobState::Done).await;
        claim.disarm();

        Ok(RewriteReport::new(job, rewritten, scores))
    }

    async fn finish(&self, token: Uuid, state: JobState) {
        if let Err(e) = self.jobs.remove(token).await {
            error!("Failed to clear job {token}: {e}");
        }
        info!("Job {token} finished: {state:?}");
    }
}

/// Removes a claimed job on drop unless `disarm` ran first. Covers a panicking
/// rewrite and a handler future dropped on client disconnect.
struct ClaimGuard {
    jobs: Arc<dyn JobStore>,
    token: Uuid,
    armed: bool,
}

impl ClaimGuard {
    fn new(jobs: Arc<dyn JobStore>, token: Uuid) -> Self {
        Self {
            jobs,
            token,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for ClaimGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let jobs = self.jobs.clone();
        let token = self.token;
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    match jobs.remove(token).await {
                        Ok(()) => warn!("Job {token} released after an interrupted rewrite"),
                        Err(e) => error!("Failed to release job {token}: {e}"),
                    }
                });
            }
            Err(_) => error!("Job {token} left claimed: no runtime to release it"),
        }
    }
}

/// Picks the uploaded file's text when a file is present, else the typed text.
async fn resolve_text(
    input_text: Option<String>,
    file: Option<UploadedDocument>,
) -> Result<String, AppError> {
    let typed = input_text.filter(|t| !t.trim().is_empty());

    match (file, typed) {
        (Some(document), _) => {
            if !document.is_accepted() {
                return Err(AppError::UnsupportedFormat {
                    extension: document.extension(),
                });
            }
            let extension = document.extension();
            let text = extract_blocking(document)
                .await?
                .and_then(|text| require_content(&extension, text))?;
            Ok(text)
        }
        (None, Some(text)) => Ok(text),
        (None, None) => Err(AppError::Validation(MISSING_INPUT_MESSAGE.to_string())),
    }
}

fn score_with_thread_rng(original: &str, rewritten: &str) -> RewriteScores {
    score_rewrite(original, rewritten, &mut RngNoise(rand::rng()))
}
