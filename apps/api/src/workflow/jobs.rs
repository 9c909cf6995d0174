//! Short-lived job records linking a validated submission to its processing step.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::StoreError;
use crate::humanize::RewriteOptions;
use crate::workflow::clock::Clock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    AwaitingInput,
    Validated,
    Rewriting,
    Done,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub token: Uuid,
    pub text: String,
    pub options: RewriteOptions,
    pub state: JobState,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl JobRecord {
    /// A freshly validated job with a random token.
    pub fn validated(
        text: String,
        options: RewriteOptions,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            token: Uuid::new_v4(),
            text,
            options,
            state: JobState::Validated,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Outcome of trying to move a job into `Rewriting`.
#[derive(Debug, Clone, PartialEq)]
pub enum Claim {
    Claimed(JobRecord),
    /// Another request is already rewriting this job.
    Busy,
    /// Unknown token or expired record.
    Missing,
}

#[async_trait]
pub trait JobStore: Send + Sync {
    async fn insert(&self, record: &JobRecord) -> Result<(), StoreError>;

    /// Atomically moves a `Validated` job to `Rewriting` and returns it.
    async fn claim(&self, token: Uuid) -> Result<Claim, StoreError>;

    async fn remove(&self, token: Uuid) -> Result<(), StoreError>;
}

pub struct InMemoryJobStore {
    jobs: DashMap<Uuid, JobRecord>,
    clock: Arc<dyn Clock>,
}

impl InMemoryJobStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            jobs: DashMap::new(),
            clock,
        }
    }

    /// Drops every expired job. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.jobs.len();
        self.jobs.retain(|_, job| !job.is_expired(now));
        before.saturating_sub(self.jobs.len())
    }

    #[cfg(test)]
    pub fn get(&self, token: Uuid) -> Option<JobRecord> {
        self.jobs.get(&token).map(|job| job.clone())
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn insert(&self, record: &JobRecord) -> Result<(), StoreError> {
        self.jobs.insert(record.token, record.clone());
        Ok(())
    }

    async fn claim(&self, token: Uuid) -> Result<Claim, StoreError> {
        let now = self.clock.now();
        self.jobs.remove_if(&token, |_, job| job.is_expired(now));

        let Some(mut job) = self.jobs.get_mut(&token) else {
            return Ok(Claim::Missing);
        };
        if job.state == JobState::Rewriting {
            return Ok(Claim::Busy);
        }
        job.state = JobState::Rewriting;
        Ok(Claim::Claimed(job.clone()))
    }

    async fn remove(&self, token: Uuid) -> Result<(), StoreError> {
        self.jobs.remove(&token);
        Ok(())
    }
}

const JOB_KEY_PREFIX: &str = "humanizer:job:";

/// Redis-backed store. Records are JSON under `SET EX`; claiming takes a
/// `SET NX` lock key with the same lifetime as the record.
#[derive(Clone)]
pub struct RedisJobStore {
    conn: MultiplexedConnection,
    clock: Arc<dyn Clock>,
}

impl RedisJobStore {
    pub fn new(conn: MultiplexedConnection, clock: Arc<dyn Clock>) -> Self {
        Self { conn, clock }
    }

    fn record_key(token: Uuid) -> String {
        format!("{JOB_KEY_PREFIX}{token}")
    }

    fn lock_key(token: Uuid) -> String {
        format!("{JOB_KEY_PREFIX}{token}:lock")
    }

    fn remaining_secs(&self, record: &JobRecord) -> u64 {
        (record.expires_at - self.clock.now()).num_seconds().max(1) as u64
    }
}

#[async_trait]
impl JobStore for RedisJobStore {
    async fn insert(&self, record: &JobRecord) -> Result<(), StoreError> {
        let payload = serde_json::to_string(record)?;
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(
            Self::record_key(record.token),
            payload,
            self.remaining_secs(record),
        )
        .await?;
        Ok(())
    }

    async fn claim(&self, token: Uuid) -> Result<Claim, StoreError> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = conn.get(Self::record_key(token)).await?;
        let Some(payload) = payload else {
            return Ok(Claim::Missing);
        };
        let mut record: JobRecord = serde_json::from_str(&payload)?;
        if record.is_expired(self.clock.now()) {
            return Ok(Claim::Missing);
        }

        let ttl = self.remaining_secs(&record);
        let locked: Option<String> = redis::cmd("SET")
            .arg(Self::lock_key(token))
            .arg(1)
            .arg("NX")
            .arg("EX")
            .arg(ttl)
            .query_async(&mut conn)
            .await?;
        if locked.is_none() {
            return Ok(Claim::Busy);
        }

        record.state = JobState::Rewriting;
        conn.set_ex::<_, _, ()>(
            Self::record_key(token),
            serde_json::to_string(&record)?,
            ttl,
        )
        .await?;
        Ok(Claim::Claimed(record))
    }

    async fn remove(&self, token: Uuid) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(vec![Self::record_key(token), Self::lock_key(token)])
            .await?;
        Ok(())
    }
}
