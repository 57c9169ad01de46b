//! In-memory `SessionStore` with clock-driven expiry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;

use crate::domain::ports::{SessionStore, SessionStoreError};
use crate::domain::{SessionHandle, SessionRecord};

struct Slot {
    record: SessionRecord,
    evict_at: DateTime<Utc>,
}

/// Mutex-guarded map of handle to record.
///
/// Expired entries are dropped on `load` of the same handle and swept on
/// every `save`, so abandoned sessions do not accumulate.
pub struct InMemorySessionStore {
    clock: Arc<dyn Clock>,
    slots: Mutex<HashMap<SessionHandle, Slot>>,
}

impl InMemorySessionStore {
    /// Create an empty store reading time from `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn slots(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<SessionHandle, Slot>>, SessionStoreError> {
        self.slots
            .lock()
            .map_err(|_| SessionStoreError::backend("in-memory session map lock poisoned"))
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn save(
        &self,
        handle: &SessionHandle,
        record: &SessionRecord,
        ttl: Duration,
    ) -> Result<(), SessionStoreError> {
        let lifetime = TimeDelta::from_std(ttl)
            .map_err(|err| SessionStoreError::backend(format!("invalid ttl: {err}")))?;
        let now = self.clock.utc();
        let evict_at = now + lifetime;
        let mut slots = self.slots()?;
        slots.retain(|_, slot| now < slot.evict_at);
        slots.insert(
            handle.clone(),
            Slot {
                record: record.clone(),
                evict_at,
            },
        );
        Ok(())
    }

    async fn load(&self, handle: &SessionHandle) -> Result<Option<SessionRecord>, SessionStoreError> {
        let now = self.clock.utc();
        let mut slots = self.slots()?;
        let expired = match slots.get(handle) {
            None => return Ok(None),
            Some(slot) => now >= slot.evict_at,
        };
        if expired {
            slots.remove(handle);
            return Ok(None);
        }
        Ok(slots.get(handle).map(|slot| slot.record.clone()))
    }

    async fn remove(&self, handle: &SessionHandle) -> Result<(), SessionStoreError> {
        self.slots()?.remove(handle);
        Ok(())
    }
}
