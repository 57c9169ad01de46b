//! Outbound adapters implementing the domain's driven ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel ORM
//! - **memory**: process-local repositories for development and tests
//! - **session**: Redis and in-memory session stores
//! - **security**: Argon2id password hashing
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod memory;
pub mod persistence;
pub mod security;
pub mod session;
