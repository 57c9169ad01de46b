//! Process-local adapters for development and tests.
//!
//! Each repository guards its state with a `std::sync::Mutex` that is never
//! held across an `.await`. They enforce the same uniqueness and
//! conditional-update rules as the PostgreSQL schema, so services behave
//! identically over either backend.

mod egg_ledger;
mod friendships;
mod users;

pub use egg_ledger::InMemoryEggLedgerRepository;
pub use friendships::InMemoryFriendshipRepository;
pub use users::InMemoryUserRepository;

/// Message used when a guard was poisoned by a panicking writer.
const POISONED: &str = "in-memory store lock poisoned";
