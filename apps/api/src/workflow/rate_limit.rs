//! Per-client submission rate limiting.
//!
//! A client may submit once per window. Only the time of the last accepted
//! submission is kept, and each entry expires after one window so the store
//! never grows past the set of recently active clients.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::{debug, warn};

use crate::errors::{AppError, StoreError};
use crate::workflow::clock::Clock;

/// Storage for last-submission timestamps, keyed by client.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Records a submission at `at` unless the client already holds an unexpired
    /// entry. The check and the write are one atomic step. Returns the held
    /// timestamp when the client is still inside its window; a recorded entry
    /// expires after `ttl`.
    async fn try_acquire(
        &self,
        client_key: &str,
        at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Option<DateTime<Utc>>, StoreError>;
}

struct Stamp {
    at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl Stamp {
    fn new(at: DateTime<Utc>, ttl: Duration) -> Self {
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self { at, expires_at }
    }
}

/// Process-local store. Expired entries are replaced on acquire and dropped by `purge_expired`.
pub struct InMemoryRateLimitStore {
    entries: DashMap<String, Stamp>,
    clock: Arc<dyn Clock>,
}

impl InMemoryRateLimitStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    /// Drops every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, stamp| stamp.expires_at > now);
        before.saturating_sub(self.entries.len())
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn try_acquire(
        &self,
        client_key: &str,
        at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        // The shard lock is held across the check and the write.
        match self.entries.entry(client_key.to_string()) {
            Entry::Occupied(held) if held.get().expires_at > at => Ok(Some(held.get().at)),
            Entry::Occupied(mut stale) => {
                stale.insert(Stamp::new(at, ttl));
                Ok(None)
            }
            Entry::Vacant(slot) => {
                slot.insert(Stamp::new(at, ttl));
                Ok(None)
            }
        }
    }
}

const REDIS_KEY_PREFIX: &str = "humanizer:ratelimit:";

/// Attempts before a key that keeps expiring between `SET NX` and `GET` is treated as held.
const REDIS_ACQUIRE_ATTEMPTS: usize = 3;

/// Redis-backed store; timestamps are stored as epoch milliseconds under `SET NX EX`.
#[derive(Clone)]
pub struct RedisRateLimitStore {
    conn: MultiplexedConnection,
}

impl RedisRateLimitStore {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl RateLimitStore for RedisRateLimitStore {
    async fn try_acquire(
        &self,
        client_key: &str,
        at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        let mut conn = self.conn.clone();
        let key = format!("{REDIS_KEY_PREFIX}{client_key}");

        for _ in 0..REDIS_ACQUIRE_ATTEMPTS {
            let recorded: Option<String> = redis::cmd("SET")
                .arg(&key)
                .arg(at.timestamp_millis())
                .arg("NX")
                .arg("EX")
                .arg(ttl.as_secs().max(1))
                .query_async(&mut conn)
                .await?;
            if recorded.is_some() {
                return Ok(None);
            }

            let millis: Option<i64> = conn.get(&key).await?;
            if let Some(millis) = millis {
                return Ok(Some(DateTime::from_timestamp_millis(millis).unwrap_or(at)));
            }
        }

        Ok(Some(at))
    }
}

/// Allows one submission per client per window.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    clock: Arc<dyn Clock>,
    window: Duration,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>, clock: Arc<dyn Clock>, window: Duration) -> Self {
        Self {
            store,
            clock,
            window,
        }
    }

    /// Rejects the client if its last accepted submission is younger than the
    /// window; otherwise records this one in the same store operation.
    pub async fn check_and_record(&self, client_key: &str) -> Result<(), AppError> {
        let now = self.clock.now();

        if let Some(last) = self.store.try_acquire(client_key, now, self.window).await? {
            let elapsed = (now - last).to_std().unwrap_or_default();
            warn!(
                client = client_key,
                elapsed_secs = elapsed.as_secs(),
                "Rate limit exceeded"
            );
            return Err(AppError::RateLimited {
                window_secs: self.window.as_secs(),
            });
        }

        debug!(client = client_key, "Submission recorded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::clock::ManualClock;

    fn limiter() -> (RateLimiter, Arc<ManualClock>, Arc<InMemoryRateLimitStore>) {
        let clock = Arc::new(ManualClock::new());
        let store = Arc::new(InMemoryRateLimitStore::new(clock.clone()));
        let limiter = RateLimiter::new(store.clone(), clock.clone(), Duration::from_secs(30));
        (limiter, clock, store)
    }

    #[tokio::test]
    async fn test_second_submission_within_window_is_rejected() {
        let (limiter, clock, _) = limiter();
        limiter.check_and_record("10.0.0.1").await.unwrap();

        clock.advance_secs(10);
        let err = limiter.check_and_record("10.0.0.1").await.unwrap_err();
        assert!(matches!(err, AppError::RateLimited { window_secs: 30 }));
    }

    #[tokio::test]
    async fn test_submission_after_window_is_accepted() {
        let (limiter, clock, _) = limiter();
        limiter.check_and_record("10.0.0.1").await.unwrap();

        clock.advance_secs(31);
        limiter.check_and_record("10.0.0.1").await.unwrap();
    }

    #[tokio::test]
    async fn test_rejection_does_not_extend_window() {
        let (limiter, clock, _) = limiter();
        limiter.check_and_record("a").await.unwrap();
        clock.advance_secs(20);
        assert!(limiter.check_and_record("a").await.is_err());
        clock.advance_secs(11);
        limiter.check_and_record("a").await.unwrap();
    }

    #[tokio::test]
    async fn test_clients_are_independent() {
        let (limiter, _, _) = limiter();
        limiter.check_and_record("a").await.unwrap();
        limiter.check_and_record("b").await.unwrap();
        assert!(limiter.check_and_record("a").await.is_err());
    }

    #[tokio::test]
    async fn test_expired_entries_are_evicted() {
        let (limiter, clock, store) = limiter();
        limiter.check_and_record("a").await.unwrap();
        limiter.check_and_record("b").await.unwrap();
        assert_eq!(store.len(), 2);

        clock.advance_secs(30);
        limiter.check_and_record("a").await.unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submissions_admit_exactly_one() {
        let (limiter, _, _) = limiter();
        let attempts: Vec<_> = (0..32)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move { limiter.check_and_record("10.0.0.9").await })
            })
            .collect();

        let mut admitted = 0;
        for attempt in attempts {
            match attempt.await.unwrap() {
                Ok(()) => admitted += 1,
                Err(err) => assert!(matches!(err, AppError::RateLimited { .. })),
            }
        }
        assert_eq!(admitted, 1);
    }

    #[tokio::test]
    async fn test_acquire_reports_held_timestamp() {
        let (_, clock, store) = limiter();
        let window = Duration::from_secs(30);
        let first = clock.now();
        assert_eq!(store.try_acquire("a", first, window).await.unwrap(), None);

        clock.advance_secs(5);
        assert_eq!(
            store.try_acquire("a", clock.now(), window).await.unwrap(),
            Some(first)
        );
    }
}
