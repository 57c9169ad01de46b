//! In-memory `UserRepository`.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{User, UserCredentials, UserId, Username};

use super::POISONED;

/// Users held in insertion order; lookups scan linearly.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<UserCredentials>>,
}

impl InMemoryUserRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_users<T>(
        &self,
        f: impl FnOnce(&mut Vec<UserCredentials>) -> Result<T, UserRepositoryError>,
    ) -> Result<T, UserRepositoryError> {
        let mut guard = self
            .users
            .lock()
            .map_err(|_| UserRepositoryError::query(POISONED))?;
        f(&mut guard)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, credentials: &UserCredentials) -> Result<(), UserRepositoryError> {
        self.with_users(|users| {
            let candidate = &credentials.user;
            if users
                .iter()
                .any(|stored| stored.user.username() == candidate.username())
            {
                return Err(UserRepositoryError::duplicate_username());
            }
            if users
                .iter()
                .any(|stored| stored.user.email() == candidate.email())
            {
                return Err(UserRepositoryError::duplicate_email());
            }
            users.push(credentials.clone());
            Ok(())
        })
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, UserRepositoryError> {
        self.with_users(|users| {
            Ok(users
                .iter()
                .find(|stored| stored.user.email().as_str() == email)
                .cloned())
        })
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        self.with_users(|users| {
            Ok(users
                .iter()
                .find(|stored| stored.user.id() == id)
                .map(|stored| stored.user.clone()))
        })
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserRepositoryError> {
        self.with_users(|users| {
            Ok(users
                .iter()
                .find(|stored| stored.user.username() == username)
                .map(|stored| stored.user.clone()))
        })
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, UserRepositoryError> {
        self.with_users(|users| {
            Ok(users
                .iter()
                .filter(|stored| ids.contains(stored.user.id()))
                .map(|stored| stored.user.clone())
                .collect())
        })
    }
}
