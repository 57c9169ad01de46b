//! Driving port for registration, authentication, and profile lookup.
//!
//! Inbound adapters call this port without knowing which repository or hasher
//! sits behind it, so handler tests substitute a mock.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, Registration, User, UserId};

/// Identity use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Create an account. Duplicate usernames or emails yield `conflict`.
    async fn register(&self, registration: Registration) -> Result<User, Error>;

    /// Check credentials. Unknown email and wrong password fail identically.
    async fn authenticate(&self, credentials: LoginCredentials) -> Result<User, Error>;

    /// Non-secret profile for `id`, or `not_found`.
    async fn get_by_id(&self, id: &UserId) -> Result<User, Error>;
}
