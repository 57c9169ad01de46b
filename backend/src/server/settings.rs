//! Application settings loaded via OrthoConfig.
//!
//! Sources are layered as CLI flags over `EGGCOUNTER_*` environment
//! variables over defaults.

use std::net::SocketAddr;
use std::time::Duration;

use eggcounter::domain::DEFAULT_SESSION_TTL;
use eggcounter::inbound::http::session_config::BuildMode;
use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_STORAGE_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Settings controlling the listener and the storage backends.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "EGGCOUNTER")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Absent means in-memory repositories.
    pub database_url: Option<String>,
    /// Redis URL for sessions. Absent means the in-memory session store.
    pub redis_url: Option<String>,
    /// Fixed session lifetime from login, in seconds.
    pub session_ttl_secs: Option<u64>,
    /// Deadline applied to every storage call, in milliseconds.
    pub storage_timeout_ms: Option<u64>,
    /// Upper bound on pooled PostgreSQL connections.
    pub db_max_connections: Option<u32>,
    /// Permit in-memory repositories in release builds.
    #[ortho_config(default = false)]
    pub allow_in_memory: bool,
}

/// Invalid or unsafe combination of settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// `bind_addr` is not a socket address.
    #[error("invalid bind address '{value}': {source}")]
    InvalidBindAddr {
        /// The rejected value.
        value: String,
        /// Parser failure.
        #[source]
        source: std::net::AddrParseError,
    },
    /// A duration setting was zero.
    #[error("{name} must be greater than zero")]
    Zero {
        /// Setting name.
        name: &'static str,
    },
    /// No database configured and in-memory storage not allowed.
    #[error(
        "EGGCOUNTER_DATABASE_URL is not set; set EGGCOUNTER_ALLOW_IN_MEMORY=true to run \
         without persistence"
    )]
    MissingDatabaseUrl,
}

/// Where users, ledger entries and friendships live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persistence {
    /// Diesel repositories over PostgreSQL.
    Postgres {
        /// Connection string.
        database_url: String,
    },
    /// Process-local adapters; data is lost on restart.
    InMemory,
}

impl AppSettings {
    /// Socket address to listen on.
    ///
    /// # Errors
    ///
    /// [`SettingsError::InvalidBindAddr`] when the value does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse()
            .map_err(|source| SettingsError::InvalidBindAddr {
                value: raw.to_owned(),
                source,
            })
    }

    /// Session lifetime.
    ///
    /// # Errors
    ///
    /// [`SettingsError::Zero`] for a zero lifetime.
    pub fn session_ttl(&self) -> Result<Duration, SettingsError> {
        match self.session_ttl_secs {
            None => Ok(DEFAULT_SESSION_TTL),
            Some(0) => Err(SettingsError::Zero {
                name: "session_ttl_secs",
            }),
            Some(secs) => Ok(Duration::from_secs(secs)),
        }
    }

    /// Budget for the storage calls of one request.
    ///
    /// # Errors
    ///
    /// [`SettingsError::Zero`] for a zero budget.
    pub fn storage_timeout(&self) -> Result<Duration, SettingsError> {
        match self.storage_timeout_ms.unwrap_or(DEFAULT_STORAGE_TIMEOUT_MS) {
            0 => Err(SettingsError::Zero {
                name: "storage_timeout_ms",
            }),
            millis => Ok(Duration::from_millis(millis)),
        }
    }

    /// Pool size, at least one.
    #[must_use]
    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
            .max(1)
    }

    /// Choose the persistence backend. Release builds need a database unless
    /// in-memory storage was explicitly allowed.
    pub fn persistence(&self, mode: BuildMode) -> Result<Persistence, SettingsError> {
        let database_url = self
            .database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty());
        match database_url {
            Some(url) => Ok(Persistence::Postgres {
                database_url: url.to_owned(),
            }),
            None if mode == BuildMode::Debug || self.allow_in_memory => Ok(Persistence::InMemory),
            None => Err(SettingsError::MissingDatabaseUrl),
        }
    }
}
