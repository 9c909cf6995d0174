use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm_api_key: String,
    pub llm_base_url: String,
    pub llm_timeout_secs: u64,
    /// When set, rate-limit and job records live in Redis instead of process memory.
    pub redis_url: Option<String>,
    pub rate_limit_window_secs: u64,
    pub job_ttl_secs: u64,
    /// Key rate limits on the first `X-Forwarded-For` entry. Only enable behind a proxy
    /// that overwrites the header.
    pub trust_forwarded_for: bool,
    pub port: u16,
    pub rust_log: String,
}

pub const DEFAULT_LLM_BASE_URL: &str = "https://openrouter.ai/api/v1";

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            llm_api_key: require_env("OPENAI_API_KEY")?,
            llm_base_url: std::env::var("LLM_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_LLM_BASE_URL.to_string()),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 45)?,
            redis_url: std::env::var("REDIS_URL").ok().filter(|v| !v.trim().is_empty()),
            rate_limit_window_secs: parse_env("RATE_LIMIT_WINDOW_SECS", 30)?,
            job_ttl_secs: parse_env("JOB_TTL_SECS", 600)?,
            trust_forwarded_for: parse_env("TRUST_FORWARDED_FOR", false)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Configuration used by handler and orchestrator tests.
    pub fn for_tests() -> Self {
        Config {
            llm_api_key: "test-key".to_string(),
            llm_base_url: "http://127.0.0.1:9".to_string(),
            llm_timeout_secs: 5,
            redis_url: None,
            rate_limit_window_secs: 30,
            job_ttl_secs: 600,
            trust_forwarded_for: false,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}
