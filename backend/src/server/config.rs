//! Resolved server configuration.

use std::net::SocketAddr;
use std::time::Duration;

use eggcounter::domain::StorageDeadline;
use eggcounter::inbound::http::session::SessionCookieConfig;
use eggcounter::inbound::http::session_config::{BuildMode, CookiePolicy};

use super::settings::{AppSettings, Persistence, SettingsError};

/// Everything needed to wire adapters and start the listener.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) persistence: Persistence,
    pub(crate) redis_url: Option<String>,
    pub(crate) db_max_connections: u32,
    pub(crate) session_ttl: Duration,
    pub(crate) deadline: StorageDeadline,
    pub(crate) cookies: SessionCookieConfig,
}

impl ServerConfig {
    /// Validate `settings` and combine them with the cookie policy.
    pub fn from_settings(
        settings: &AppSettings,
        policy: CookiePolicy,
        mode: BuildMode,
    ) -> Result<Self, SettingsError> {
        let session_ttl = settings.session_ttl()?;
        Ok(Self {
            bind_addr: settings.bind_addr()?,
            persistence: settings.persistence(mode)?,
            redis_url: settings
                .redis_url
                .clone()
                .filter(|url| !url.trim().is_empty()),
            db_max_connections: settings.db_max_connections(),
            session_ttl,
            deadline: StorageDeadline::new(settings.storage_timeout()?),
            cookies: SessionCookieConfig {
                policy,
                max_age: session_ttl,
            },
        })
    }

    /// Listener address.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn cookie_lifetime_matches_session_ttl() {
        let settings = AppSettings {
            bind_addr: Some("127.0.0.1:0".to_owned()),
            database_url: None,
            redis_url: Some(String::new()),
            session_ttl_secs: Some(120),
            storage_timeout_ms: Some(750),
            db_max_connections: None,
            allow_in_memory: false,
        };

        let config = ServerConfig::from_settings(&settings, CookiePolicy::default(), BuildMode::Debug)
            .expect("valid settings");

        assert_eq!(config.cookies.max_age, Duration::from_secs(120));
        assert_eq!(config.session_ttl, Duration::from_secs(120));
        assert_eq!(config.deadline.timeout(), Duration::from_millis(750));
        assert_eq!(config.persistence, Persistence::InMemory);
        assert!(config.redis_url.is_none());
        assert!(config.cookies.policy.secure);
    }
}
