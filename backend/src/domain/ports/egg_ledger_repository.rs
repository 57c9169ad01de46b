//! Port for the append-only egg ledger.

use async_trait::async_trait;

use crate::domain::{EggEntry, EggEntryId, NewEggEntry, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by egg ledger adapters.
    pub enum EggLedgerRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "egg ledger connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "egg ledger query failed: {message}",
        /// A compensating entry for this entry already exists.
        AlreadyReversed { entry_id: i64 } => "egg entry {entry_id} has already been reversed",
    }
}

/// Append-only storage of egg entries.
///
/// Adapters never update or delete entries. At most one entry may reverse any
/// given entry; a second reversal fails with `AlreadyReversed`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EggLedgerRepository: Send + Sync {
    /// Append an entry and return it with its assigned id.
    async fn append(&self, entry: &NewEggEntry) -> Result<EggEntry, EggLedgerRepositoryError>;

    /// Fetch an entry by id, regardless of owner.
    async fn find_by_id(&self, id: EggEntryId)
    -> Result<Option<EggEntry>, EggLedgerRepositoryError>;

    /// Sum of all entry amounts for the user; zero when there are none.
    async fn total_for(&self, user_id: &UserId) -> Result<i64, EggLedgerRepositoryError>;

    /// Newest entries first (by `created_at`, then id), at most `limit`.
    async fn recent_for(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<EggEntry>, EggLedgerRepositoryError>;
}
