//! Identity domain service.
//!
//! Implements [`IdentityStore`] over a [`UserRepository`] and a
//! [`PasswordHasher`]. Hashing runs on the blocking thread pool with the
//! caller's trace id carried across.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;
use zeroize::Zeroizing;

use crate::domain::auth::fields;
use crate::domain::ports::{
    IdentityStore, PasswordHasher, PasswordHasherError, UserRepository, UserRepositoryError,
};
use crate::domain::{
    Error, FieldErrors, LoginCredentials, Registration, StorageDeadline, TraceId, User,
    UserCredentials, UserId,
};

/// Message for every failed login, whatever the cause.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

const USERNAME_TAKEN: &str = "Username is already taken";
const EMAIL_TAKEN: &str = "Email is already registered";

fn conflict_on(field: &str, message: &str) -> Error {
    let errors: FieldErrors = [(field, message)].into_iter().collect();
    Error::conflict(message).with_field_errors(errors)
}

fn map_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::DuplicateUsername => conflict_on(fields::USERNAME, USERNAME_TAKEN),
        UserRepositoryError::DuplicateEmail => conflict_on(fields::EMAIL, EMAIL_TAKEN),
    }
}

fn map_hasher_error(error: PasswordHasherError) -> Error {
    Error::internal(error.to_string())
}

/// Identity service implementing the [`IdentityStore`] driving port.
#[derive(Clone)]
pub struct IdentityService<R> {
    users: Arc<R>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
    deadline: StorageDeadline,
}

impl<R> IdentityService<R> {
    /// Create a new identity service.
    #[must_use]
    pub fn new(
        users: Arc<R>,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
        deadline: StorageDeadline,
    ) -> Self {
        Self {
            users,
            hasher,
            clock,
            deadline,
        }
    }

    async fn with_hasher<T, F>(&self, work: F) -> Result<T, Error>
    where
        T: Send + 'static,
        F: FnOnce(&dyn PasswordHasher) -> Result<T, PasswordHasherError> + Send + 'static,
    {
        let hasher = Arc::clone(&self.hasher);
        let trace_id = TraceId::current();
        tokio::task::spawn_blocking(move || TraceId::sync_scope(trace_id, || work(hasher.as_ref())))
            .await
            .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
            .map_err(map_hasher_error)
    }
}

#[async_trait]
impl<R> IdentityStore for IdentityService<R>
where
    R: UserRepository,
{
    async fn register(&self, registration: Registration) -> Result<User, Error> {
        let password = Zeroizing::new(registration.password().to_owned());
        let password_hash = self
            .with_hasher(move |hasher| hasher.hash(password.as_str()))
            .await?;

        let user = User::new(
            UserId::random(),
            registration.username().clone(),
            registration.email().clone(),
            registration.first_name().clone(),
            registration.last_name().clone(),
            self.clock.utc(),
        );
        let credentials = UserCredentials {
            user,
            password_hash,
        };

        self.deadline
            .bound("users.insert", self.users.insert(&credentials))
            .await?
            .map_err(map_repository_error)?;

        info!(user_id = %credentials.user.id(), "user registered");
        Ok(credentials.user)
    }

    async fn authenticate(&self, credentials: LoginCredentials) -> Result<User, Error> {
        let found = self
            .deadline
            .bound(
                "users.find_credentials_by_email",
                self.users.find_credentials_by_email(credentials.email()),
            )
            .await?
            .map_err(map_repository_error)?;

        let (candidate, stored_hash) = found.map_or_else(
            || (None, self.hasher.decoy_hash()),
            |UserCredentials {
                 user,
                 password_hash,
             }| (Some(user), password_hash),
        );

        let password = Zeroizing::new(credentials.password().to_owned());
        let matches = self
            .with_hasher(move |hasher| hasher.verify(password.as_str(), &stored_hash))
            .await?;

        match candidate {
            Some(user) if matches => {
                info!(user_id = %user.id(), "user authenticated");
                Ok(user)
            }
            _ => Err(Error::unauthorized(INVALID_CREDENTIALS)),
        }
    }

    async fn get_by_id(&self, id: &UserId) -> Result<User, Error> {
        self.deadline
            .bound("users.find_by_id", self.users.find_by_id(id))
            .await?
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found("User not found"))
    }
}

#[cfg(test)]
#[path = "identity_service_tests.rs"]
mod tests;
