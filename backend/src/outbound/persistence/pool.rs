//! Shared PostgreSQL pool for the Diesel repositories.
//!
//! Every repository checks out one connection per port call. Checkout waits
//! at most the storage deadline so a saturated pool reports a connection
//! failure instead of queueing requests indefinitely.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection, RunError};

/// Connection type handed to repositories.
type PgConnection<'a> = PooledConnection<'a, AsyncPgConnection>;

/// The pool could not be built or could not hand out a connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// No connection could be handed out.
    #[error("failed to get connection from pool: {message}")]
    Checkout {
        /// Underlying failure.
        message: String,
    },
    /// The pool configuration was rejected.
    #[error("failed to build connection pool: {message}")]
    Build {
        /// Underlying failure.
        message: String,
    },
}

impl PoolError {
    /// Build [`PoolError::Checkout`].
    #[must_use]
    pub fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout {
            message: message.into(),
        }
    }

    /// Build [`PoolError::Build`].
    #[must_use]
    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }
}

impl From<RunError> for PoolError {
    fn from(error: RunError) -> Self {
        match error {
            RunError::TimedOut => Self::checkout("timed out waiting for a connection"),
            RunError::User(inner) => Self::checkout(inner.to_string()),
        }
    }
}

/// Sizing and checkout limits for [`DbPool`].
#[derive(Debug, Clone)]
pub struct PoolConfig {
    database_url: String,
    max_size: u32,
    checkout_timeout: Duration,
}

impl PoolConfig {
    const DEFAULT_MAX_SIZE: u32 = 10;
    const DEFAULT_CHECKOUT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Defaults for `database_url`: ten connections, five second checkout.
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_size: Self::DEFAULT_MAX_SIZE,
            checkout_timeout: Self::DEFAULT_CHECKOUT_TIMEOUT,
        }
    }

    /// At least one connection is always allowed.
    #[must_use]
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size.max(1);
        self
    }

    /// How long a checkout may wait for a free connection.
    #[must_use]
    pub const fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.checkout_timeout = timeout;
        self
    }

    /// Connection string.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}

/// Cloneable handle to the bb8 pool of async Diesel connections.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Build the pool. Connections are opened lazily, so an unreachable
    /// database surfaces on first checkout rather than here.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Build`] when bb8 rejects the configuration.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.database_url);
        let inner = Pool::builder()
            .max_size(config.max_size)
            .min_idle(Some(1))
            .connection_timeout(config.checkout_timeout)
            .build(manager)
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;
        Ok(Self { inner })
    }

    /// Check out a connection.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Checkout`] when no connection is available within
    /// the checkout timeout or the database refuses the connection.
    pub async fn get(&self) -> Result<PgConnection<'_>, PoolError> {
        Ok(self.inner.get().await?)
    }
}
