//! Request and response bodies for the HTTP API.
//!
//! Domain types stay free of framework and OpenAPI concerns; these DTOs fix
//! the wire shape (camelCase) and carry the `utoipa` schemas.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{EggEntry, Friend, Friendship, PendingFriendRequest, User};

/// Registration form. Missing fields are treated as empty so that every
/// validation failure can be reported at once.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct RegisterRequest {
    /// Login name, unique.
    #[schema(example = "henrietta")]
    pub username: String,
    /// Given name.
    #[schema(example = "Henrietta")]
    pub firstname: String,
    /// Family name.
    #[schema(example = "Layer")]
    pub lastname: String,
    /// Email address, unique; used to log in.
    #[schema(example = "hen@example.com")]
    pub email: String,
    /// Plaintext password, at least eight characters.
    #[schema(example = "correct horse")]
    pub password: String,
}

/// Login body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct LoginRequest {
    /// Registered email address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Body of `POST /api/eggcount`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct AddEggsRequest {
    /// Positive number of eggs, at most 1000.
    #[serde(default)]
    #[schema(example = 2)]
    pub amount: Option<i64>,
}

/// Body of `POST /api/friends/requests`: exactly one of the two fields.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestBody {
    /// Recipient by user id.
    #[serde(default, alias = "toUserID")]
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub to_user_id: Option<String>,
    /// Recipient by username.
    #[serde(default)]
    pub username: Option<String>,
}

/// Public profile; never includes credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// User id (UUID).
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    /// Login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            username: user.username().as_str().to_owned(),
            email: user.email().as_str().to_owned(),
            first_name: user.first_name().as_str().to_owned(),
            last_name: user.last_name().as_str().to_owned(),
        }
    }
}

/// `data` of login and auth status responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SessionUser {
    /// Signed-in user, or `null` without a valid session.
    pub user: Option<UserProfile>,
}

/// One ledger entry. Compensating entries are negative and name the entry
/// they reverse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EggEntryBody {
    /// Entry id, increasing in append order.
    pub id: i64,
    /// Signed egg count.
    pub amount: i32,
    /// Id of the entry this one undoes.
    pub reverses: Option<i64>,
    /// Append time.
    pub created_at: DateTime<Utc>,
}

impl From<&EggEntry> for EggEntryBody {
    fn from(entry: &EggEntry) -> Self {
        Self {
            id: entry.id.get(),
            amount: entry.amount,
            reverses: entry.reverses.map(|id| id.get()),
            created_at: entry.created_at,
        }
    }
}

/// `data` of `GET /api/eggcount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EggTotal {
    /// Sum of every entry.
    pub total_eggs: i64,
}

/// `data` of ledger mutations: the appended entry and the new total.
///
/// `totalEggs` is `null` when the entry was stored but the follow-up total
/// could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerChange {
    /// The entry just appended.
    pub entry: EggEntryBody,
    /// Total after the append.
    pub total_eggs: Option<i64>,
}

/// `data` of `GET /api/dashboard`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// Signed-in user.
    pub user: UserProfile,
    /// Sum of every entry.
    pub total_eggs: i64,
    /// Latest entries, newest first.
    pub recent_entries: Vec<EggEntryBody>,
}

/// Stored friend relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FriendshipBody {
    /// Relationship id.
    pub id: i64,
    /// Sender.
    pub from_user_id: String,
    /// Recipient.
    pub to_user_id: String,
    /// `pending`, `accepted` or `rejected`.
    #[schema(example = "pending")]
    pub status: String,
    /// When the request was sent.
    pub created_at: DateTime<Utc>,
    /// When the recipient answered.
    pub responded_at: Option<DateTime<Utc>>,
}

impl From<&Friendship> for FriendshipBody {
    fn from(friendship: &Friendship) -> Self {
        Self {
            id: friendship.id.get(),
            from_user_id: friendship.from_user_id.to_string(),
            to_user_id: friendship.to_user_id.to_string(),
            status: friendship.status.as_str().to_owned(),
            created_at: friendship.created_at,
            responded_at: friendship.responded_at,
        }
    }
}

/// Incoming pending request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PendingRequestBody {
    /// Relationship id to accept or reject.
    pub id: i64,
    /// Sender profile.
    pub requester: UserProfile,
    /// When the request was sent.
    pub created_at: DateTime<Utc>,
}

impl From<&PendingFriendRequest> for PendingRequestBody {
    fn from(request: &PendingFriendRequest) -> Self {
        Self {
            id: request.id.get(),
            requester: UserProfile::from(&request.requester),
            created_at: request.created_at,
        }
    }
}

/// Accepted friend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FriendBody {
    /// Accepted relationship id.
    pub relationship_id: i64,
    /// Profile of the other party.
    pub friend: UserProfile,
    /// When the friendship began.
    pub since: DateTime<Utc>,
}

impl From<&Friend> for FriendBody {
    fn from(friend: &Friend) -> Self {
        Self {
            relationship_id: friend.relationship_id.get(),
            friend: UserProfile::from(&friend.friend),
            since: friend.since,
        }
    }
}
