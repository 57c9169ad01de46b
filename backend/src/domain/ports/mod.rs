//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`SessionStore`], [`PasswordHasher`]) are
//! implemented by outbound adapters and return typed errors. Driving ports
//! ([`IdentityStore`], [`SessionResolver`], [`EggLedger`], [`FriendGraph`])
//! are called by inbound adapters and return the domain [`Error`].
//!
//! [`Error`]: crate::domain::Error

mod macros;
pub(crate) use macros::define_port_error;

mod egg_ledger;
mod egg_ledger_repository;
mod friend_graph;
mod friendship_repository;
mod identity_store;
mod password_hasher;
mod session_resolver;
mod session_store;
mod user_repository;

#[cfg(test)]
pub use egg_ledger::MockEggLedger;
pub use egg_ledger::EggLedger;
#[cfg(test)]
pub use egg_ledger_repository::MockEggLedgerRepository;
pub use egg_ledger_repository::{EggLedgerRepository, EggLedgerRepositoryError};
#[cfg(test)]
pub use friend_graph::MockFriendGraph;
pub use friend_graph::FriendGraph;
#[cfg(test)]
pub use friendship_repository::MockFriendshipRepository;
pub use friendship_repository::{FriendshipRepository, FriendshipRepositoryError};
#[cfg(test)]
pub use identity_store::MockIdentityStore;
pub use identity_store::IdentityStore;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use session_resolver::MockSessionResolver;
pub use session_resolver::SessionResolver;
#[cfg(test)]
pub use session_store::MockSessionStore;
pub use session_store::{SessionStore, SessionStoreError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
