//! PostgreSQL-backed `FriendshipRepository` implementation using Diesel ORM.
//!
//! A partial unique index over the unordered pair keeps at most one pending
//! or accepted relationship per pair. Decisions are single conditional
//! `UPDATE`s so concurrent accept and reject cannot both apply.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{FriendshipRepository, FriendshipRepositoryError};
use crate::domain::{Friendship, FriendshipId, FriendshipStatus, NewFriendship, UserId};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error, classify_pool_error};
use super::models::{FriendshipRow, NewFriendshipRow};
use super::pool::{DbPool, PoolError};
use super::schema::friendships;

const ACTIVE_PAIR_INDEX: &str = "friendships_active_pair_idx";

const ACTIVE_STATUSES: [&str; 2] = [
    FriendshipStatus::Pending.as_str(),
    FriendshipStatus::Accepted.as_str(),
];

/// Diesel-backed implementation of the friendship repository port.
#[derive(Clone)]
pub struct DieselFriendshipRepository {
    pool: DbPool,
}

impl DieselFriendshipRepository {
    /// Create a new repository with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: DieselFailure) -> FriendshipRepositoryError {
    if failure.violates(ACTIVE_PAIR_INDEX) {
        return FriendshipRepositoryError::active_relationship_exists();
    }
    match failure {
        DieselFailure::Connection(message) => FriendshipRepositoryError::connection(message),
        DieselFailure::Query(message) => FriendshipRepositoryError::query(message),
        DieselFailure::UniqueViolation { constraint } => {
            FriendshipRepositoryError::query(format!(
                "unexpected unique violation: {}",
                constraint.as_deref().unwrap_or("unknown")
            ))
        }
    }
}

fn map_pool_error(error: PoolError) -> FriendshipRepositoryError {
    map_failure(classify_pool_error(error))
}

fn map_diesel_error(error: diesel::result::Error) -> FriendshipRepositoryError {
    map_failure(classify_diesel_error(error))
}

fn row_to_friendship(row: FriendshipRow) -> Result<Friendship, FriendshipRepositoryError> {
    let status = row
        .status
        .parse::<FriendshipStatus>()
        .map_err(|err| FriendshipRepositoryError::query(err.to_string()))?;
    Ok(Friendship {
        id: FriendshipId::new(row.id),
        from_user_id: UserId::from_uuid(row.from_user_id),
        to_user_id: UserId::from_uuid(row.to_user_id),
        status,
        created_at: row.created_at,
        responded_at: row.responded_at,
    })
}

fn rows_to_friendships(
    rows: Vec<FriendshipRow>,
) -> Result<Vec<Friendship>, FriendshipRepositoryError> {
    rows.into_iter().map(row_to_friendship).collect()
}

#[async_trait]
impl FriendshipRepository for DieselFriendshipRepository {
    async fn create_pending(
        &self,
        request: &NewFriendship,
    ) -> Result<Friendship, FriendshipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewFriendshipRow {
            from_user_id: *request.from_user_id.as_uuid(),
            to_user_id: *request.to_user_id.as_uuid(),
            status: FriendshipStatus::Pending.as_str(),
            created_at: request.created_at,
        };

        let stored = diesel::insert_into(friendships::table)
            .values(&row)
            .returning(FriendshipRow::as_returning())
            .get_result::<FriendshipRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_friendship(stored)
    }

    async fn find_active_between(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Option<Friendship>, FriendshipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (first, second) = (a.as_uuid(), b.as_uuid());

        let row = friendships::table
            .filter(
                friendships::from_user_id
                    .eq(first)
                    .and(friendships::to_user_id.eq(second))
                    .or(friendships::from_user_id
                        .eq(second)
                        .and(friendships::to_user_id.eq(first))),
            )
            .filter(friendships::status.eq_any(ACTIVE_STATUSES))
            .select(FriendshipRow::as_select())
            .first::<FriendshipRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_friendship).transpose()
    }

    async fn find_by_id(
        &self,
        id: FriendshipId,
    ) -> Result<Option<Friendship>, FriendshipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = friendships::table
            .filter(friendships::id.eq(id.get()))
            .select(FriendshipRow::as_select())
            .first::<FriendshipRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_friendship).transpose()
    }

    async fn transition_pending(
        &self,
        id: FriendshipId,
        recipient: &UserId,
        status: FriendshipStatus,
        responded_at: DateTime<Utc>,
    ) -> Result<Option<Friendship>, FriendshipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let target = friendships::table
            .filter(friendships::id.eq(id.get()))
            .filter(friendships::to_user_id.eq(recipient.as_uuid()))
            .filter(friendships::status.eq(FriendshipStatus::Pending.as_str()));

        let row = diesel::update(target)
            .set((
                friendships::status.eq(status.as_str()),
                friendships::responded_at.eq(Some(responded_at)),
            ))
            .returning(FriendshipRow::as_returning())
            .get_result::<FriendshipRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_friendship).transpose()
    }

    async fn list_pending_incoming(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Friendship>, FriendshipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<FriendshipRow> = friendships::table
            .filter(friendships::to_user_id.eq(user_id.as_uuid()))
            .filter(friendships::status.eq(FriendshipStatus::Pending.as_str()))
            .order((friendships::created_at.asc(), friendships::id.asc()))
            .select(FriendshipRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_friendships(rows)
    }

    async fn list_accepted_for(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Friendship>, FriendshipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user = user_id.as_uuid();

        let rows: Vec<FriendshipRow> = friendships::table
            .filter(
                friendships::from_user_id
                    .eq(user)
                    .or(friendships::to_user_id.eq(user)),
            )
            .filter(friendships::status.eq(FriendshipStatus::Accepted.as_str()))
            .order(friendships::id.asc())
            .select(FriendshipRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_friendships(rows)
    }
}
