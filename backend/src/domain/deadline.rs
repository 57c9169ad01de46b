//! Deadline applied to storage calls.
//!
//! A stalled store must fail the request instead of hanging it, so services
//! run each port call through [`StorageDeadline::bound`]. Inside
//! [`StorageDeadline::request_scope`] the budget is measured from the start
//! of the request, so sequential calls share one deadline rather than each
//! receiving a fresh timeout.

use std::future::Future;
use std::time::Duration;

use tokio::task_local;
use tokio::time::Instant;
use tracing::warn;

use super::error::Error;

/// Default deadline for a single storage call.
pub const DEFAULT_STORAGE_TIMEOUT: Duration = Duration::from_secs(5);

task_local! {
    /// When the current request started.
    static REQUEST_STARTED: Instant;
}

/// Storage budget per request, or per call outside a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageDeadline(Duration);

impl StorageDeadline {
    /// Create a deadline of `timeout`.
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self(timeout)
    }

    /// The configured budget.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.0
    }

    /// Run `fut` as one request: every [`bound`](Self::bound) call inside it
    /// shares a budget that started now.
    pub async fn request_scope<Fut>(fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        REQUEST_STARTED.scope(Instant::now(), fut).await
    }

    fn expires_at(&self) -> Instant {
        REQUEST_STARTED
            .try_with(|started| *started + self.0)
            .unwrap_or_else(|_| Instant::now() + self.0)
    }

    /// Await `call`, failing with `service_unavailable` once the deadline
    /// passes.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use eggcounter::domain::StorageDeadline;
    ///
    /// # tokio::runtime::Runtime::new().expect("runtime").block_on(async {
    /// let deadline = StorageDeadline::new(Duration::from_millis(50));
    /// let value = deadline.bound("example", async { 7 }).await.expect("in time");
    /// assert_eq!(value, 7);
    /// # });
    /// ```
    pub async fn bound<F>(&self, operation: &'static str, call: F) -> Result<F::Output, Error>
    where
        F: Future,
    {
        tokio::time::timeout_at(self.expires_at(), call).await.map_err(|_| {
            warn!(operation, timeout_ms = self.0.as_millis(), "storage call timed out");
            Error::service_unavailable("Storage did not respond in time")
        })
    }
}

impl Default for StorageDeadline {
    fn default() -> Self {
        Self::new(DEFAULT_STORAGE_TIMEOUT)
    }
}
