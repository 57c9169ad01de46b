//! Redis-backed `SessionStore` using a `bb8-redis` pool.
//!
//! Records are JSON under `session:v1:<handle>` and written with
//! `SET ... EX <ttl>`, so Redis evicts them without a sweeper.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::{self, Pool, RunError};
use bb8_redis::redis::{self, RedisError};
use tracing::debug;

use crate::domain::ports::{SessionStore, SessionStoreError};
use crate::domain::{SessionHandle, SessionRecord};

const KEY_PREFIX: &str = "session:v1:";

/// Failure while building the Redis pool.
#[derive(Debug, thiserror::Error)]
pub enum RedisSessionStoreError {
    /// The connection URL was rejected.
    #[error("invalid redis url: {0}")]
    InvalidUrl(#[source] RedisError),
    /// The pool could not be built.
    #[error("failed to build redis pool: {0}")]
    Build(#[source] RedisError),
}

/// Session store backed by Redis.
#[derive(Clone)]
pub struct RedisSessionStore {
    pool: Pool<RedisConnectionManager>,
}

impl RedisSessionStore {
    /// Connect a pool to `url` with at most `max_size` connections.
    pub async fn connect(
        url: &str,
        max_size: u32,
        connection_timeout: Duration,
    ) -> Result<Self, RedisSessionStoreError> {
        let manager =
            RedisConnectionManager::new(url).map_err(RedisSessionStoreError::InvalidUrl)?;
        let pool = bb8::Pool::builder()
            .max_size(max_size.max(1))
            .connection_timeout(connection_timeout)
            .build(manager)
            .await
            .map_err(RedisSessionStoreError::Build)?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    #[must_use]
    pub fn from_pool(pool: Pool<RedisConnectionManager>) -> Self {
        Self { pool }
    }

    async fn connection(
        &self,
    ) -> Result<bb8::PooledConnection<'_, RedisConnectionManager>, SessionStoreError> {
        self.pool.get().await.map_err(map_run_error)
    }
}

fn key_for(handle: &SessionHandle) -> String {
    format!("{KEY_PREFIX}{}", handle.expose())
}

fn map_redis_error(error: RedisError) -> SessionStoreError {
    debug!(error = %error, "redis command failed");
    if error.is_io_error()
        || error.is_connection_refusal()
        || error.is_connection_dropped()
        || error.is_timeout()
    {
        SessionStoreError::connection(error.to_string())
    } else {
        SessionStoreError::backend(error.to_string())
    }
}

fn map_run_error(error: RunError<RedisError>) -> SessionStoreError {
    match error {
        RunError::User(err) => map_redis_error(err),
        RunError::TimedOut => SessionStoreError::connection("timed out waiting for redis"),
    }
}

fn encode(record: &SessionRecord) -> Result<String, SessionStoreError> {
    serde_json::to_string(record).map_err(|err| SessionStoreError::corrupt(err.to_string()))
}

fn decode(raw: &str) -> Result<SessionRecord, SessionStoreError> {
    serde_json::from_str(raw).map_err(|err| SessionStoreError::corrupt(err.to_string()))
}

/// Redis rejects `EX 0`; sub-second TTLs round up to one second.
fn ttl_seconds(ttl: Duration) -> u64 {
    let secs = ttl.as_secs();
    if ttl.subsec_nanos() > 0 { secs + 1 } else { secs.max(1) }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn save(
        &self,
        handle: &SessionHandle,
        record: &SessionRecord,
        ttl: Duration,
    ) -> Result<(), SessionStoreError> {
        let payload = encode(record)?;
        let mut conn = self.connection().await?;
        redis::cmd("SET")
            .arg(key_for(handle))
            .arg(payload)
            .arg("EX")
            .arg(ttl_seconds(ttl))
            .query_async::<()>(&mut *conn)
            .await
            .map_err(map_redis_error)
    }

    async fn load(&self, handle: &SessionHandle) -> Result<Option<SessionRecord>, SessionStoreError> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = redis::cmd("GET")
            .arg(key_for(handle))
            .query_async(&mut *conn)
            .await
            .map_err(map_redis_error)?;
        raw.as_deref().map(decode).transpose()
    }

    async fn remove(&self, handle: &SessionHandle) -> Result<(), SessionStoreError> {
        let mut conn = self.connection().await?;
        redis::cmd("DEL")
            .arg(key_for(handle))
            .query_async::<()>(&mut *conn)
            .await
            .map_err(map_redis_error)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rstest::rstest;

    use super::*;
    use crate::domain::UserId;

    #[rstest]
    fn keys_are_namespaced() {
        let handle = SessionHandle::generate();
        let key = key_for(&handle);
        assert!(key.starts_with("session:v1:"));
        assert!(key.ends_with(handle.expose()));
    }

    #[rstest]
    #[case(Duration::from_secs(86_400), 86_400)]
    #[case(Duration::from_millis(1_500), 2)]
    #[case(Duration::ZERO, 1)]
    fn ttl_rounds_up_to_whole_seconds(#[case] ttl: Duration, #[case] expected: u64) {
        assert_eq!(ttl_seconds(ttl), expected);
    }

    #[rstest]
    fn record_survives_json_encoding() {
        let now = Utc::now();
        let record = SessionRecord {
            user_id: UserId::random(),
            created_at: now,
            expires_at: now + chrono::TimeDelta::hours(24),
        };
        let raw = encode(&record).expect("encode");
        assert_eq!(decode(&raw).expect("decode"), record);
    }

    #[rstest]
    fn garbage_payload_is_corrupt() {
        let err = decode("{not json").expect_err("garbage");
        assert!(matches!(err, SessionStoreError::Corrupt { .. }));
    }

    #[rstest]
    fn pool_timeout_is_a_connection_error() {
        let err = map_run_error(RunError::TimedOut);
        assert!(matches!(err, SessionStoreError::Connection { .. }));
    }
}
