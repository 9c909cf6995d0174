mod config;
mod errors;
mod export;
mod extraction;
mod humanize;
mod llm_client;
mod routes;
mod scoring;
mod state;
mod workflow;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::humanize::Rewriter;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::workflow::clock::{Clock, SystemClock};
use crate::workflow::jobs::{InMemoryJobStore, JobStore, RedisJobStore};
use crate::workflow::rate_limit::{
    InMemoryRateLimitStore, RateLimitStore, RateLimiter, RedisRateLimitStore,
};
use crate::workflow::Orchestrator;

/// How often expired in-memory entries are swept.
const PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Humanizer API v{}", env!("CARGO_PKG_VERSION"));

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // Initialize LLM client
    let llm = LlmClient::new(
        config.llm_api_key.clone(),
        &config.llm_base_url,
        Duration::from_secs(config.llm_timeout_secs),
    )?;
    info!("LLM client initialized ({})", config.llm_base_url);

    // Rate-limit and job stores: Redis when configured, process memory otherwise
    let (rate_store, job_store) = build_stores(&config, clock.clone()).await?;

    let rate_limiter = RateLimiter::new(
        rate_store,
        clock.clone(),
        Duration::from_secs(config.rate_limit_window_secs),
    );
    let orchestrator = Orchestrator::new(
        rate_limiter,
        job_store,
        Rewriter::new(Arc::new(llm)),
        clock,
        Duration::from_secs(config.job_ttl_secs),
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        orchestrator: Arc::new(orchestrator),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

async fn build_stores(
    config: &Config,
    clock: Arc<dyn Clock>,
) -> Result<(Arc<dyn RateLimitStore>, Arc<dyn JobStore>)> {
    if let Some(url) = &config.redis_url {
        let client = redis::Client::open(url.as_str())?;
        let conn = client.get_multiplexed_async_connection().await?;
        let rate_store: Arc<dyn RateLimitStore> = Arc::new(RedisRateLimitStore::new(conn.clone()));
        let job_store: Arc<dyn JobStore> = Arc::new(RedisJobStore::new(conn, clock));
        info!("Redis stores initialized");
        return Ok((rate_store, job_store));
    }

    let rate_store = Arc::new(InMemoryRateLimitStore::new(clock.clone()));
    let job_store = Arc::new(InMemoryJobStore::new(clock));
    spawn_purger(rate_store.clone(), job_store.clone());
    info!("In-memory stores initialized");

    let rate_store: Arc<dyn RateLimitStore> = rate_store;
    let job_store: Arc<dyn JobStore> = job_store;
    Ok((rate_store, job_store))
}

/// Periodically drops expired in-memory entries so idle clients do not accumulate.
fn spawn_purger(rate_store: Arc<InMemoryRateLimitStore>, job_store: Arc<InMemoryJobStore>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PURGE_INTERVAL);
        loop {
            interval.tick().await;
            let limits = rate_store.purge_expired();
            let jobs = job_store.purge_expired();
            if limits + jobs > 0 {
                tracing::debug!("Purged {limits} rate-limit entries and {jobs} jobs");
            }
        }
    });
}
