//! Driving port for the egg ledger.

use async_trait::async_trait;

use crate::domain::{EggAmount, EggEntry, EggEntryId, Error, UserId};

/// Egg ledger use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EggLedger: Send + Sync {
    /// Record a direct addition.
    async fn append(&self, user_id: &UserId, amount: EggAmount) -> Result<EggEntry, Error>;

    /// Current total: the sum of every entry, zero for a new user.
    async fn total(&self, user_id: &UserId) -> Result<i64, Error>;

    /// Newest entries first, at most `limit`.
    async fn recent(&self, user_id: &UserId, limit: usize) -> Result<Vec<EggEntry>, Error>;

    /// Reverse one of the user's own entries by appending its negation.
    async fn undo(&self, user_id: &UserId, entry_id: EggEntryId) -> Result<EggEntry, Error>;
}
