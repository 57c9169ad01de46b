//! Session domain service.
//!
//! Sessions use a fixed lifetime measured from login. Every resolve checks
//! `expires_at` itself, so a store that evicts late cannot extend a session.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, warn};

use crate::domain::ports::{SessionResolver, SessionStore, SessionStoreError};
use crate::domain::{Error, SessionHandle, SessionRecord, StorageDeadline, UserId};

/// Message for every missing, unknown, or expired session.
pub const UNAUTHENTICATED: &str = "Unauthorized. Please log in.";

/// Default session lifetime: 24 hours.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

fn map_store_error(error: SessionStoreError) -> Error {
    match error {
        SessionStoreError::Connection { message } => {
            Error::service_unavailable(format!("session store unavailable: {message}"))
        }
        SessionStoreError::Backend { message } | SessionStoreError::Corrupt { message } => {
            Error::internal(format!("session store error: {message}"))
        }
    }
}

/// Session service implementing the [`SessionResolver`] driving port.
#[derive(Clone)]
pub struct SessionService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    deadline: StorageDeadline,
}

impl<S> SessionService<S> {
    /// Create a new session service issuing sessions that live for `ttl`.
    #[must_use]
    pub fn new(
        store: Arc<S>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
        deadline: StorageDeadline,
    ) -> Self {
        Self {
            store,
            clock,
            ttl,
            deadline,
        }
    }

    /// Lifetime of newly established sessions.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl<S> SessionService<S>
where
    S: SessionStore,
{
    async fn discard_expired(&self, handle: &SessionHandle) {
        let outcome = self
            .deadline
            .bound("sessions.remove", self.store.remove(handle))
            .await;
        match outcome {
            Ok(Ok(())) => debug!(session = %handle.fingerprint(), "expired session discarded"),
            Ok(Err(error)) => {
                warn!(session = %handle.fingerprint(), %error, "failed to discard expired session");
            }
            Err(error) => {
                warn!(session = %handle.fingerprint(), %error, "failed to discard expired session");
            }
        }
    }
}

#[async_trait]
impl<S> SessionResolver for SessionService<S>
where
    S: SessionStore,
{
    async fn resolve(&self, handle: &SessionHandle) -> Result<UserId, Error> {
        let record = self
            .deadline
            .bound("sessions.load", self.store.load(handle))
            .await?
            .map_err(map_store_error)?;

        let Some(record) = record else {
            return Err(Error::unauthorized(UNAUTHENTICATED));
        };
        if record.is_expired_at(self.clock.utc()) {
            self.discard_expired(handle).await;
            return Err(Error::unauthorized(UNAUTHENTICATED));
        }
        Ok(record.user_id)
    }

    async fn establish(&self, user_id: &UserId) -> Result<SessionHandle, Error> {
        let lifetime = chrono::Duration::from_std(self.ttl)
            .map_err(|err| Error::internal(format!("session ttl out of range: {err}")))?;
        let created_at = self.clock.utc();
        let record = SessionRecord {
            user_id: user_id.clone(),
            created_at,
            expires_at: created_at + lifetime,
        };
        let handle = SessionHandle::generate();

        self.deadline
            .bound("sessions.save", self.store.save(&handle, &record, self.ttl))
            .await?
            .map_err(map_store_error)?;

        debug!(session = %handle.fingerprint(), %user_id, "session established");
        Ok(handle)
    }

    async fn destroy(&self, handle: &SessionHandle) -> Result<(), Error> {
        self.deadline
            .bound("sessions.remove", self.store.remove(handle))
            .await?
            .map_err(map_store_error)?;
        debug!(session = %handle.fingerprint(), "session destroyed");
        Ok(())
    }
}

#[cfg(test)]
#[path = "session_service_tests.rs"]
mod tests;
