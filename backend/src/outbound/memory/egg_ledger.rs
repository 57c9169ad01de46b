//! In-memory `EggLedgerRepository`.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::ports::{EggLedgerRepository, EggLedgerRepositoryError};
use crate::domain::{EggEntry, EggEntryId, NewEggEntry, UserId};

use super::POISONED;

#[derive(Debug, Default)]
struct LedgerState {
    entries: Vec<EggEntry>,
    next_id: i64,
}

/// Append-only ledger kept in a vector ordered by id.
#[derive(Debug, Default)]
pub struct InMemoryEggLedgerRepository {
    state: Mutex<LedgerState>,
}

impl InMemoryEggLedgerRepository {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(
        &self,
        f: impl FnOnce(&mut LedgerState) -> Result<T, EggLedgerRepositoryError>,
    ) -> Result<T, EggLedgerRepositoryError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| EggLedgerRepositoryError::query(POISONED))?;
        f(&mut guard)
    }
}

#[async_trait]
impl EggLedgerRepository for InMemoryEggLedgerRepository {
    async fn append(&self, entry: &NewEggEntry) -> Result<EggEntry, EggLedgerRepositoryError> {
        self.with_state(|state| {
            if let Some(target) = entry.reverses {
                if state.entries.iter().any(|stored| stored.reverses == Some(target)) {
                    return Err(EggLedgerRepositoryError::already_reversed(target.get()));
                }
            }
            state.next_id += 1;
            let stored = EggEntry {
                id: EggEntryId::new(state.next_id),
                user_id: entry.user_id.clone(),
                amount: entry.amount,
                reverses: entry.reverses,
                created_at: entry.created_at,
            };
            state.entries.push(stored.clone());
            Ok(stored)
        })
    }

    async fn find_by_id(
        &self,
        id: EggEntryId,
    ) -> Result<Option<EggEntry>, EggLedgerRepositoryError> {
        self.with_state(|state| Ok(state.entries.iter().find(|e| e.id == id).cloned()))
    }

    async fn total_for(&self, user_id: &UserId) -> Result<i64, EggLedgerRepositoryError> {
        self.with_state(|state| {
            Ok(state
                .entries
                .iter()
                .filter(|e| &e.user_id == user_id)
                .map(|e| i64::from(e.amount))
                .sum())
        })
    }

    async fn recent_for(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<EggEntry>, EggLedgerRepositoryError> {
        self.with_state(|state| {
            let mut owned: Vec<EggEntry> = state
                .entries
                .iter()
                .filter(|e| &e.user_id == user_id)
                .cloned()
                .collect();
            owned.sort_by(|a, b| {
                b.created_at
                    .cmp(&a.created_at)
                    .then_with(|| b.id.get().cmp(&a.id.get()))
            });
            owned.truncate(limit);
            Ok(owned)
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use rstest::rstest;

    use super::*;
    use crate::domain::EggAmount;

    fn addition(user: &UserId, amount: i64) -> NewEggEntry {
        NewEggEntry::addition(
            user.clone(),
            EggAmount::new(amount).expect("valid amount"),
            Utc::now(),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn total_sums_only_the_owners_entries() {
        let repo = InMemoryEggLedgerRepository::new();
        let hen = UserId::random();
        let other = UserId::random();
        repo.append(&addition(&hen, 4)).await.expect("append");
        repo.append(&addition(&hen, 2)).await.expect("append");
        repo.append(&addition(&other, 9)).await.expect("append");

        assert_eq!(repo.total_for(&hen).await.expect("total"), 6);
        assert_eq!(repo.total_for(&UserId::random()).await.expect("total"), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn second_reversal_of_the_same_entry_is_refused() {
        let repo = InMemoryEggLedgerRepository::new();
        let hen = UserId::random();
        let target = repo.append(&addition(&hen, 3)).await.expect("append");

        repo.append(&NewEggEntry::reversal_of(&target, Utc::now()))
            .await
            .expect("first reversal");
        let err = repo
            .append(&NewEggEntry::reversal_of(&target, Utc::now()))
            .await
            .expect_err("second reversal");

        assert_eq!(
            err,
            EggLedgerRepositoryError::AlreadyReversed {
                entry_id: target.id.get()
            }
        );
        assert_eq!(repo.total_for(&hen).await.expect("total"), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn recent_orders_newest_first_and_honours_limit() {
        let repo = InMemoryEggLedgerRepository::new();
        let hen = UserId::random();
        let base = Utc::now();
        for offset in 0..4 {
            let mut entry = addition(&hen, offset + 1);
            entry.created_at = base + Duration::seconds(offset);
            repo.append(&entry).await.expect("append");
        }

        let recent = repo.recent_for(&hen, 2).await.expect("recent");
        let amounts: Vec<i32> = recent.iter().map(|e| e.amount).collect();
        assert_eq!(amounts, vec![4, 3]);
    }
}
