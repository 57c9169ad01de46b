//! Egg ledger domain service.
//!
//! Totals are always derived from the entries, so concurrent appends need no
//! coordination beyond what the store gives each insert.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{EggLedger, EggLedgerRepository, EggLedgerRepositoryError};
use crate::domain::{
    EggAmount, EggEntry, EggEntryId, Error, NewEggEntry, StorageDeadline, UserId,
};

/// Shared by "no such entry" and "someone else's entry".
pub const ENTRY_NOT_FOUND: &str = "Egg entry not found";

/// Upper bound on `recent` page size.
pub const MAX_RECENT_LIMIT: usize = 100;

fn map_repository_error(error: EggLedgerRepositoryError) -> Error {
    match error {
        EggLedgerRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("egg ledger unavailable: {message}"))
        }
        EggLedgerRepositoryError::Query { message } => {
            Error::internal(format!("egg ledger error: {message}"))
        }
        EggLedgerRepositoryError::AlreadyReversed { .. } => {
            Error::conflict("Entry has already been undone")
        }
    }
}

/// Egg ledger service implementing the [`EggLedger`] driving port.
#[derive(Clone)]
pub struct EggLedgerService<R> {
    entries: Arc<R>,
    clock: Arc<dyn Clock>,
    deadline: StorageDeadline,
}

impl<R> EggLedgerService<R> {
    /// Create a new ledger service.
    #[must_use]
    pub fn new(entries: Arc<R>, clock: Arc<dyn Clock>, deadline: StorageDeadline) -> Self {
        Self {
            entries,
            clock,
            deadline,
        }
    }
}

#[async_trait]
impl<R> EggLedger for EggLedgerService<R>
where
    R: EggLedgerRepository,
{
    async fn append(&self, user_id: &UserId, amount: EggAmount) -> Result<EggEntry, Error> {
        let entry = NewEggEntry::addition(user_id.clone(), amount, self.clock.utc());
        let stored = self
            .deadline
            .bound("egg_entries.append", self.entries.append(&entry))
            .await?
            .map_err(map_repository_error)?;
        info!(%user_id, entry_id = %stored.id, amount = stored.amount, "eggs recorded");
        Ok(stored)
    }

    async fn total(&self, user_id: &UserId) -> Result<i64, Error> {
        self.deadline
            .bound("egg_entries.total", self.entries.total_for(user_id))
            .await?
            .map_err(map_repository_error)
    }

    async fn recent(&self, user_id: &UserId, limit: usize) -> Result<Vec<EggEntry>, Error> {
        let capped = limit.min(MAX_RECENT_LIMIT);
        if capped == 0 {
            return Ok(Vec::new());
        }
        self.deadline
            .bound("egg_entries.recent", self.entries.recent_for(user_id, capped))
            .await?
            .map_err(map_repository_error)
    }

    async fn undo(&self, user_id: &UserId, entry_id: EggEntryId) -> Result<EggEntry, Error> {
        let target = self
            .deadline
            .bound("egg_entries.find_by_id", self.entries.find_by_id(entry_id))
            .await?
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(ENTRY_NOT_FOUND))?;

        if &target.user_id != user_id {
            return Err(Error::forbidden(ENTRY_NOT_FOUND));
        }
        if target.is_compensating() {
            return Err(Error::conflict("An undo entry cannot itself be undone"));
        }

        let reversal = NewEggEntry::reversal_of(&target, self.clock.utc());
        let stored = self
            .deadline
            .bound("egg_entries.append", self.entries.append(&reversal))
            .await?
            .map_err(map_repository_error)?;
        info!(%user_id, %entry_id, reversal_id = %stored.id, "egg entry undone");
        Ok(stored)
    }
}

#[cfg(test)]
#[path = "egg_ledger_service_tests.rs"]
mod tests;
