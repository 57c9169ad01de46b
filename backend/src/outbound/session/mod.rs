//! Session store adapters.
//!
//! - [`RedisSessionStore`]: shared store for deployments with several
//!   workers, keyed `session:v1:<handle>` with a server-side TTL.
//! - [`InMemorySessionStore`]: single-process store whose expiry follows an
//!   injected clock.

mod memory;
mod redis;

pub use memory::InMemorySessionStore;
pub use redis::{RedisSessionStore, RedisSessionStoreError};
