//! Port for server-side session records.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{SessionHandle, SessionRecord};

use super::define_port_error;

define_port_error! {
    /// Errors raised by session store adapters.
    pub enum SessionStoreError {
        /// The store could not be reached.
        Connection { message: String } => "session store connection failed: {message}",
        /// The store rejected or failed a command.
        Backend { message: String } => "session store command failed: {message}",
        /// A stored record could not be decoded.
        Corrupt { message: String } => "session record is corrupt: {message}",
    }
}

/// Key-value store for sessions keyed by their opaque handle.
///
/// Stores may evict a record once `ttl` elapses; callers still check
/// [`SessionRecord::expires_at`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store `record` under `handle`, replacing any previous value.
    async fn save(
        &self,
        handle: &SessionHandle,
        record: &SessionRecord,
        ttl: Duration,
    ) -> Result<(), SessionStoreError>;

    /// Load the record for `handle`.
    async fn load(&self, handle: &SessionHandle) -> Result<Option<SessionRecord>, SessionStoreError>;

    /// Remove the record for `handle`. Removing a missing record succeeds.
    async fn remove(&self, handle: &SessionHandle) -> Result<(), SessionStoreError>;
}
