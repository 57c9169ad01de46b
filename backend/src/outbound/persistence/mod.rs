//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories are thin translators between Diesel rows and domain types.
//! Row structs and the schema stay private to this module; every failure is
//! classified once in `diesel_error_mapping` and then mapped to the owning
//! port's error.
//!
//! ```ignore
//! use eggcounter::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/eggs")).await?;
//! let users = DieselUserRepository::new(pool);
//! ```

mod diesel_egg_ledger_repository;
mod diesel_error_mapping;
mod diesel_friendship_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_egg_ledger_repository::DieselEggLedgerRepository;
pub use diesel_friendship_repository::DieselFriendshipRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
