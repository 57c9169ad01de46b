//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Username and email uniqueness come from the table's unique constraints;
//! violations are reported by constraint name.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{
    EmailAddress, PasswordHash, PersonName, User, UserCredentials, UserId, Username,
};

use super::diesel_error_mapping::{
    DieselFailure, classify_diesel_error, classify_pool_error,
};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

const USERNAME_CONSTRAINT: &str = "users_username_key";
const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: DieselFailure) -> UserRepositoryError {
    if failure.violates(USERNAME_CONSTRAINT) {
        return UserRepositoryError::duplicate_username();
    }
    if failure.violates(EMAIL_CONSTRAINT) {
        return UserRepositoryError::duplicate_email();
    }
    match failure {
        DieselFailure::Connection(message) => UserRepositoryError::connection(message),
        DieselFailure::UniqueViolation { constraint } => UserRepositoryError::query(format!(
            "unexpected unique violation: {}",
            constraint.as_deref().unwrap_or("unknown")
        )),
        DieselFailure::Query(message) => UserRepositoryError::query(message),
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    map_failure(classify_pool_error(error))
}

fn map_diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    map_failure(classify_diesel_error(error))
}

fn row_to_credentials(row: UserRow) -> Result<UserCredentials, UserRepositoryError> {
    let UserRow {
        id,
        username,
        email,
        first_name,
        last_name,
        password_hash,
        created_at,
    } = row;
    let invalid = |field: &str, err: crate::domain::UserValidationError| {
        UserRepositoryError::query(format!("stored {field} is invalid: {err}"))
    };

    let user = User::new(
        UserId::from_uuid(id),
        Username::new(username).map_err(|err| invalid("username", err))?,
        EmailAddress::new(email).map_err(|err| invalid("email", err))?,
        PersonName::new(first_name).map_err(|err| invalid("first_name", err))?,
        PersonName::new(last_name).map_err(|err| invalid("last_name", err))?,
        created_at,
    );
    Ok(UserCredentials {
        user,
        password_hash: PasswordHash::new(password_hash),
    })
}

fn row_to_user(row: UserRow) -> Result<User, UserRepositoryError> {
    row_to_credentials(row).map(|credentials| credentials.user)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, credentials: &UserCredentials) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user = &credentials.user;
        let row = NewUserRow {
            id: *user.id().as_uuid(),
            username: user.username().as_str(),
            email: user.email().as_str(),
            first_name: user.first_name().as_str(),
            last_name: user.last_name().as_str(),
            password_hash: credentials.password_hash.as_str(),
            created_at: user.created_at(),
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_credentials).transpose()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = users::table
            .filter(users::username.eq(username.as_str()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, UserRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();

        let rows: Vec<UserRow> = users::table
            .filter(users::id.eq_any(uuids))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_user).collect()
    }
}
