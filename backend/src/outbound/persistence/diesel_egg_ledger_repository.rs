//! PostgreSQL-backed `EggLedgerRepository` implementation using Diesel ORM.
//!
//! Rows are only ever inserted. The unique constraint on
//! `reverses_entry_id` makes a second reversal of the same entry fail even
//! when two undos race.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{EggLedgerRepository, EggLedgerRepositoryError};
use crate::domain::{EggEntry, EggEntryId, NewEggEntry, UserId};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error, classify_pool_error};
use super::models::{EggEntryRow, NewEggEntryRow};
use super::pool::{DbPool, PoolError};
use super::schema::egg_entries;

const REVERSAL_CONSTRAINT: &str = "egg_entries_reverses_entry_id_key";

/// Diesel-backed implementation of the egg ledger port.
#[derive(Clone)]
pub struct DieselEggLedgerRepository {
    pool: DbPool,
}

impl DieselEggLedgerRepository {
    /// Create a new repository with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> EggLedgerRepositoryError {
    map_read_failure(classify_pool_error(error))
}

fn map_write_failure(failure: DieselFailure, entry: &NewEggEntry) -> EggLedgerRepositoryError {
    match entry.reverses {
        Some(target) if failure.violates(REVERSAL_CONSTRAINT) => {
            EggLedgerRepositoryError::already_reversed(target.get())
        }
        _ => map_read_failure(failure),
    }
}

fn map_read_failure(failure: DieselFailure) -> EggLedgerRepositoryError {
    match failure {
        DieselFailure::Connection(message) => EggLedgerRepositoryError::connection(message),
        DieselFailure::Query(message) => EggLedgerRepositoryError::query(message),
        DieselFailure::UniqueViolation { constraint } => EggLedgerRepositoryError::query(format!(
            "unexpected unique violation: {}",
            constraint.as_deref().unwrap_or("unknown")
        )),
    }
}

fn map_read_error(error: diesel::result::Error) -> EggLedgerRepositoryError {
    map_read_failure(classify_diesel_error(error))
}

fn row_to_entry(row: EggEntryRow) -> EggEntry {
    EggEntry {
        id: EggEntryId::new(row.id),
        user_id: UserId::from_uuid(row.user_id),
        amount: row.amount,
        reverses: row.reverses_entry_id.map(EggEntryId::new),
        created_at: row.created_at,
    }
}

#[async_trait]
impl EggLedgerRepository for DieselEggLedgerRepository {
    async fn append(&self, entry: &NewEggEntry) -> Result<EggEntry, EggLedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewEggEntryRow {
            user_id: *entry.user_id.as_uuid(),
            amount: entry.amount,
            reverses_entry_id: entry.reverses.map(EggEntryId::get),
            created_at: entry.created_at,
        };

        diesel::insert_into(egg_entries::table)
            .values(&row)
            .returning(EggEntryRow::as_returning())
            .get_result::<EggEntryRow>(&mut conn)
            .await
            .map(row_to_entry)
            .map_err(|err| map_write_failure(classify_diesel_error(err), entry))
    }

    async fn find_by_id(
        &self,
        id: EggEntryId,
    ) -> Result<Option<EggEntry>, EggLedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = egg_entries::table
            .filter(egg_entries::id.eq(id.get()))
            .select(EggEntryRow::as_select())
            .first::<EggEntryRow>(&mut conn)
            .await
            .optional()
            .map_err(map_read_error)?;

        Ok(row.map(row_to_entry))
    }

    async fn total_for(&self, user_id: &UserId) -> Result<i64, EggLedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: Option<i64> = egg_entries::table
            .filter(egg_entries::user_id.eq(user_id.as_uuid()))
            .select(diesel::dsl::sum(egg_entries::amount))
            .get_result(&mut conn)
            .await
            .map_err(map_read_error)?;

        Ok(total.unwrap_or(0))
    }

    async fn recent_for(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<EggEntry>, EggLedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row_limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows: Vec<EggEntryRow> = egg_entries::table
            .filter(egg_entries::user_id.eq(user_id.as_uuid()))
            .order((egg_entries::created_at.desc(), egg_entries::id.desc()))
            .limit(row_limit)
            .select(EggEntryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_read_error)?;

        Ok(rows.into_iter().map(row_to_entry).collect())
    }
}
