//! Shared helpers for unit tests (in `src/`) and integration tests (in
//! `tests/`). Compiled for tests or with the `test-support` feature.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use actix_web::cookie::SameSite;
use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

use crate::domain::ports::{PasswordHasherError, SessionStore, SessionStoreError};
use crate::domain::{
    EggLedgerService, FriendGraphService, IdentityService, SessionHandle, SessionRecord,
    SessionService, StorageDeadline,
};
use crate::inbound::http::session::SessionCookieConfig;
use crate::inbound::http::session_config::CookiePolicy;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::memory::{
    InMemoryEggLedgerRepository, InMemoryFriendshipRepository, InMemoryUserRepository,
};
use crate::outbound::security::Argon2Hasher;
use crate::outbound::session::InMemorySessionStore;

/// Clock whose current instant is set by the test.
#[derive(Debug)]
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Clock stopped at `now`.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Move the clock forward by `delta`.
    ///
    /// # Panics
    ///
    /// Panics when `delta` does not fit in a [`TimeDelta`].
    pub fn advance(&self, delta: Duration) {
        let step = match TimeDelta::from_std(delta) {
            Ok(step) => step,
            Err(error) => panic!("duration out of range for TimeDelta: {error}; delta={delta:?}"),
        };
        *self.lock_clock() += step;
    }

    /// Move the clock forward by whole seconds.
    pub fn advance_seconds(&self, seconds: u64) {
        self.advance(Duration::from_secs(seconds));
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Session store wrapper that counts every call reaching the inner store.
pub struct CountingSessionStore<S> {
    inner: S,
    calls: AtomicUsize,
}

impl<S> CountingSessionStore<S> {
    /// Wrap `inner` with a zeroed counter.
    #[must_use]
    pub const fn new(inner: S) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `save`, `load`, and `remove` calls observed so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl<S: SessionStore> SessionStore for CountingSessionStore<S> {
    async fn save(
        &self,
        handle: &SessionHandle,
        record: &SessionRecord,
        ttl: Duration,
    ) -> Result<(), SessionStoreError> {
        self.record_call();
        self.inner.save(handle, record, ttl).await
    }

    async fn load(&self, handle: &SessionHandle) -> Result<Option<SessionRecord>, SessionStoreError> {
        self.record_call();
        self.inner.load(handle).await
    }

    async fn remove(&self, handle: &SessionHandle) -> Result<(), SessionStoreError> {
        self.record_call();
        self.inner.remove(handle).await
    }
}

impl<S: SessionStore> CountingSessionStore<S> {
    /// Share the wrapper so a test can keep reading the counter.
    #[must_use]
    pub fn shared(inner: S) -> Arc<Self> {
        Arc::new(Self::new(inner))
    }
}

/// Every driving port wired over the in-memory adapters, with a clock the
/// test controls and a counter on the session store.
pub struct InMemoryApp {
    /// Clock every service reads.
    pub clock: Arc<MutableClock>,
    /// Session store with a call counter.
    pub sessions: Arc<CountingSessionStore<InMemorySessionStore>>,
    /// User repository.
    pub users: Arc<InMemoryUserRepository>,
    /// Egg ledger repository.
    pub eggs: Arc<InMemoryEggLedgerRepository>,
    /// Friendship repository.
    pub friendships: Arc<InMemoryFriendshipRepository>,
    hasher: Arc<Argon2Hasher>,
    ttl: Duration,
}

impl InMemoryApp {
    /// Fresh, empty stores whose sessions live for `ttl`.
    pub fn new(ttl: Duration) -> Result<Self, PasswordHasherError> {
        let clock = Arc::new(MutableClock::new(Utc::now()));
        let sessions = CountingSessionStore::shared(InMemorySessionStore::new(clock.clone()));
        Ok(Self {
            clock,
            sessions,
            users: Arc::new(InMemoryUserRepository::new()),
            eggs: Arc::new(InMemoryEggLedgerRepository::new()),
            friendships: Arc::new(InMemoryFriendshipRepository::new()),
            hasher: Arc::new(Argon2Hasher::new()?),
            ttl,
        })
    }

    /// HTTP state backed by these stores. Cookies are not `Secure` so they
    /// round-trip over the plain-HTTP test transport.
    #[must_use]
    pub fn http_state(&self) -> HttpState {
        let clock: Arc<dyn Clock> = self.clock.clone();
        let deadline = StorageDeadline::default();
        HttpState::new(
            HttpStatePorts {
                identity: Arc::new(IdentityService::new(
                    self.users.clone(),
                    self.hasher.clone(),
                    clock.clone(),
                    deadline,
                )),
                sessions: Arc::new(SessionService::new(
                    self.sessions.clone(),
                    clock.clone(),
                    self.ttl,
                    deadline,
                )),
                eggs: Arc::new(EggLedgerService::new(
                    self.eggs.clone(),
                    clock.clone(),
                    deadline,
                )),
                friends: Arc::new(FriendGraphService::new(
                    self.friendships.clone(),
                    self.users.clone(),
                    clock,
                    deadline,
                )),
            },
            SessionCookieConfig {
                policy: CookiePolicy {
                    secure: false,
                    same_site: SameSite::Lax,
                },
                max_age: self.ttl,
            },
        )
    }
}
