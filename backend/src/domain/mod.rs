//! Domain primitives, services, and ports.
//!
//! Purpose: define strongly typed entities shared by the HTTP and
//! persistence adapters, plus the services that implement the driving ports.
//! Nothing here imports actix-web, diesel, redis, or argon2.
//!
//! Public surface:
//! - Error, ErrorCode, FieldErrors: transport agnostic failures.
//! - User, UserId, Username, EmailAddress: identity.
//! - SessionHandle, SessionRecord: server-side sessions.
//! - EggEntry, EggAmount: the append-only ledger.
//! - Friendship and friends: directed friend requests.
//! - IdentityService, SessionService, EggLedgerService, FriendGraphService:
//!   driving port implementations.

pub mod auth;
pub mod deadline;
pub mod eggs;
pub mod error;
pub mod friends;
pub mod ports;
pub mod session;
pub mod trace_id;
pub mod user;

mod egg_ledger_service;
mod friend_graph_service;
mod identity_service;
mod session_service;

pub use self::auth::{LoginCredentials, LoginValidationError, PASSWORD_MIN_LENGTH, Registration};
pub use self::deadline::{DEFAULT_STORAGE_TIMEOUT, StorageDeadline};
pub use self::egg_ledger_service::{ENTRY_NOT_FOUND, EggLedgerService, MAX_RECENT_LIMIT};
pub use self::eggs::{
    EggAmount, EggAmountError, EggEntry, EggEntryId, MAX_EGGS_PER_ENTRY, NewEggEntry,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError, FieldErrors};
pub use self::friend_graph_service::{FriendGraphService, REQUEST_NOT_FOUND};
pub use self::friends::{
    Friend, FriendDecision, FriendTarget, Friendship, FriendshipId, FriendshipStatus,
    NewFriendship, PendingFriendRequest, UnknownFriendshipStatus,
};
pub use self::identity_service::{INVALID_CREDENTIALS, IdentityService};
pub use self::session::{SessionHandle, SessionRecord};
pub use self::session_service::{DEFAULT_SESSION_TTL, SessionService, UNAUTHENTICATED};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    EmailAddress, PasswordHash, PersonName, User, UserCredentials, UserId, UserValidationError,
    Username,
};
