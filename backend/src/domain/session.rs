//! Server-side session primitives.
//!
//! A [`SessionHandle`] is the opaque bearer value placed in the client's
//! cookie; the matching [`SessionRecord`] lives only in the session store.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::user::UserId;

const HANDLE_BYTES: usize = 32;
const FINGERPRINT_CHARS: usize = 12;

/// Opaque session handle: 32 OS-random bytes, hex encoded.
///
/// `Debug` and `Display` never print the handle; use
/// [`SessionHandle::fingerprint`] in logs.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionHandle(String);

impl SessionHandle {
    /// Mint a fresh handle from the operating system RNG.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0_u8; HANDLE_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Accept a client-presented value if it has the shape of a handle.
    ///
    /// # Examples
    /// ```
    /// use eggcounter::domain::SessionHandle;
    ///
    /// assert!(SessionHandle::parse("not-a-handle").is_none());
    /// let handle = SessionHandle::generate();
    /// assert!(SessionHandle::parse(handle.expose()).is_some());
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let well_formed = raw.len() == HANDLE_BYTES * 2
            && raw.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        well_formed.then(|| Self(raw.to_owned()))
    }

    /// The raw handle, for the cookie and the store key only.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// Short SHA-256 fingerprint safe to log.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        hex::encode(digest).chars().take(FINGERPRINT_CHARS).collect()
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionHandle({})", self.fingerprint())
    }
}

/// Session record persisted server-side under its handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Signed-in user.
    pub user_id: UserId,
    /// When the session was issued.
    pub created_at: DateTime<Utc>,
    /// First instant at which the session is no longer valid.
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    /// True once `now` has reached the expiry instant.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
