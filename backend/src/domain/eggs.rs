//! Egg ledger entries.
//!
//! The ledger is append-only: a user's total is always the sum of their
//! entries, and an undo appends a compensating entry instead of deleting.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::UserId;

/// Largest amount accepted in a single addition.
pub const MAX_EGGS_PER_ENTRY: i32 = 1_000;

/// Store-assigned entry identifier, increasing in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EggEntryId(i64);

impl EggEntryId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw identifier value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for EggEntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validation failure for a direct addition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EggAmountError {
    /// Zero or negative amount.
    #[error("Amount must be a positive integer")]
    NotPositive,
    /// Amount above the per-entry cap.
    #[error("Amount must be at most {max}")]
    TooLarge {
        /// The cap that was exceeded.
        max: i32,
    },
}

/// Amount for a direct addition: `1..=MAX_EGGS_PER_ENTRY`.
///
/// # Examples
/// ```
/// use eggcounter::domain::EggAmount;
///
/// assert!(EggAmount::new(0).is_err());
/// assert_eq!(EggAmount::new(12).expect("positive").get(), 12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EggAmount(i32);

impl EggAmount {
    /// Validate a client-supplied amount.
    pub fn new(raw: i64) -> Result<Self, EggAmountError> {
        if raw <= 0 {
            return Err(EggAmountError::NotPositive);
        }
        i32::try_from(raw)
            .ok()
            .filter(|value| *value <= MAX_EGGS_PER_ENTRY)
            .map(Self)
            .ok_or(EggAmountError::TooLarge {
                max: MAX_EGGS_PER_ENTRY,
            })
    }

    /// The validated amount.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

/// A stored ledger entry.
///
/// `amount` is negative exactly when the entry compensates an earlier one, in
/// which case `reverses` names that entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EggEntry {
    /// Store-assigned identifier, increasing in append order.
    pub id: EggEntryId,
    /// Owner of the entry.
    pub user_id: UserId,
    /// Signed egg count.
    pub amount: i32,
    /// Entry this one compensates, if any.
    pub reverses: Option<EggEntryId>,
    /// When the entry was appended.
    pub created_at: DateTime<Utc>,
}

impl EggEntry {
    /// True when this entry undoes another entry.
    #[must_use]
    pub fn is_compensating(&self) -> bool {
        self.reverses.is_some()
    }
}

/// Entry to be appended; the store assigns the identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEggEntry {
    /// Owner of the entry.
    pub user_id: UserId,
    /// Signed egg count.
    pub amount: i32,
    /// Entry this one compensates, if any.
    pub reverses: Option<EggEntryId>,
    /// Append time.
    pub created_at: DateTime<Utc>,
}

impl NewEggEntry {
    /// A direct addition.
    #[must_use]
    pub fn addition(user_id: UserId, amount: EggAmount, created_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            amount: amount.get(),
            reverses: None,
            created_at,
        }
    }

    /// The compensating entry for `target`.
    #[must_use]
    pub fn reversal_of(target: &EggEntry, created_at: DateTime<Utc>) -> Self {
        Self {
            user_id: target.user_id.clone(),
            amount: -target.amount,
            reverses: Some(target.id),
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, EggAmountError::NotPositive)]
    #[case(-3, EggAmountError::NotPositive)]
    #[case(1_001, EggAmountError::TooLarge { max: 1_000 })]
    #[case(i64::MAX, EggAmountError::TooLarge { max: 1_000 })]
    fn amount_rejects_out_of_range(#[case] raw: i64, #[case] expected: EggAmountError) {
        assert_eq!(EggAmount::new(raw).expect_err("out of range"), expected);
    }

    #[rstest]
    #[case(1)]
    #[case(1_000)]
    fn amount_accepts_bounds(#[case] raw: i64) {
        assert_eq!(i64::from(EggAmount::new(raw).expect("in range").get()), raw);
    }

    #[rstest]
    fn reversal_negates_target() {
        let target = EggEntry {
            id: EggEntryId::new(7),
            user_id: UserId::random(),
            amount: 5,
            reverses: None,
            created_at: Utc::now(),
        };
        let reversal = NewEggEntry::reversal_of(&target, Utc::now());
        assert_eq!(reversal.amount, -5);
        assert_eq!(reversal.reverses, Some(EggEntryId::new(7)));
        assert_eq!(reversal.user_id, target.user_id);
    }
}
