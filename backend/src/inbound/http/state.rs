//! Shared HTTP adapter state.
//!
//! Handlers receive this through `actix_web::web::Data` and depend only on
//! the driving ports, so they can be tested with mocks and no I/O.

use std::sync::Arc;

use super::session::SessionCookieConfig;
use crate::domain::ports::{EggLedger, FriendGraph, IdentityStore, SessionResolver};

/// Parameter object bundling the port implementations.
#[derive(Clone)]
pub struct HttpStatePorts {
    /// Registration, login and user lookup.
    pub identity: Arc<dyn IdentityStore>,
    /// Session issue, lookup and revocation.
    pub sessions: Arc<dyn SessionResolver>,
    /// Egg ledger.
    pub eggs: Arc<dyn EggLedger>,
    /// Friend graph.
    pub friends: Arc<dyn FriendGraph>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Registration, login and user lookup.
    pub identity: Arc<dyn IdentityStore>,
    /// Session issue, lookup and revocation.
    pub sessions: Arc<dyn SessionResolver>,
    /// Egg ledger.
    pub eggs: Arc<dyn EggLedger>,
    /// Friend graph.
    pub friends: Arc<dyn FriendGraph>,
    /// Session cookie attributes.
    pub cookies: SessionCookieConfig,
}

impl HttpState {
    /// Construct state from the ports and the session cookie settings.
    #[must_use]
    pub fn new(ports: HttpStatePorts, cookies: SessionCookieConfig) -> Self {
        let HttpStatePorts {
            identity,
            sessions,
            eggs,
            friends,
        } = ports;
        Self {
            identity,
            sessions,
            eggs,
            friends,
            cookies,
        }
    }
}
