//! Driving port mapping session handles to users.

use async_trait::async_trait;

use crate::domain::{Error, SessionHandle, UserId};

/// Session use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionResolver: Send + Sync {
    /// Resolve a handle to its user. Unknown or expired handles yield
    /// `unauthorized`.
    async fn resolve(&self, handle: &SessionHandle) -> Result<UserId, Error>;

    /// Start a session for `user_id` and return its new handle.
    async fn establish(&self, user_id: &UserId) -> Result<SessionHandle, Error>;

    /// End the session. Idempotent.
    async fn destroy(&self, handle: &SessionHandle) -> Result<(), Error>;
}
