//! Port for persisting users and their credentials.

use async_trait::async_trait;

use crate::domain::{User, UserCredentials, UserId, Username};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The username is held by another account.
        DuplicateUsername => "username is already taken",
        /// The email is held by another account.
        DuplicateEmail => "email is already registered",
    }
}

/// Port for user persistence.
///
/// Uniqueness of username and email is enforced by the adapter and reported
/// through the `Duplicate*` variants.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Store a newly registered user.
    async fn insert(&self, credentials: &UserCredentials) -> Result<(), UserRepositoryError>;

    /// Fetch a user and their password hash by normalised email.
    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, UserRepositoryError>;

    /// Fetch a user by id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch a user by exact username.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch every user in `ids`. Unknown ids are skipped; order is unspecified.
    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, UserRepositoryError>;
}
