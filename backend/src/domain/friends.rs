//! Friend relationships.
//!
//! A relationship is stored once, directed from requester to recipient, and
//! becomes visible to both parties once accepted.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::{User, UserId, Username};

/// Store-assigned relationship identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FriendshipId(i64);

impl FriendshipId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw identifier value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for FriendshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Relationship status tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendshipStatus {
    /// Awaiting the recipient's answer.
    Pending,
    /// The two users are friends.
    Accepted,
    /// The recipient declined; terminal.
    Rejected,
}

impl FriendshipStatus {
    /// Storage and wire spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    /// Pending and accepted relationships block a new request between the
    /// same pair.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Accepted)
    }
}

impl fmt::Display for FriendshipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stored status tag is unknown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown friendship status: {0}")]
pub struct UnknownFriendshipStatus(pub String);

impl FromStr for FriendshipStatus {
    type Err = UnknownFriendshipStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(UnknownFriendshipStatus(other.to_owned())),
        }
    }
}

/// Recipient's answer to a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendDecision {
    /// Become friends.
    Accept,
    /// Decline the request.
    Reject,
}

impl FriendDecision {
    /// Status the relationship moves to.
    #[must_use]
    pub const fn target_status(self) -> FriendshipStatus {
        match self {
            Self::Accept => FriendshipStatus::Accepted,
            Self::Reject => FriendshipStatus::Rejected,
        }
    }
}

/// Stored relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Friendship {
    /// Store-assigned identifier.
    pub id: FriendshipId,
    /// User who sent the request.
    pub from_user_id: UserId,
    /// User the request was sent to.
    pub to_user_id: UserId,
    /// Current state.
    pub status: FriendshipStatus,
    /// When the request was sent.
    pub created_at: DateTime<Utc>,
    /// When the recipient answered; `None` while pending.
    pub responded_at: Option<DateTime<Utc>>,
}

impl Friendship {
    /// The party that is not `user`, if `user` is involved at all.
    #[must_use]
    pub fn other_party(&self, user: &UserId) -> Option<&UserId> {
        if &self.from_user_id == user {
            Some(&self.to_user_id)
        } else if &self.to_user_id == user {
            Some(&self.from_user_id)
        } else {
            None
        }
    }

    /// When the relationship became a friendship; falls back to creation.
    #[must_use]
    pub fn since(&self) -> DateTime<Utc> {
        self.responded_at.unwrap_or(self.created_at)
    }
}

/// Request to be created; the store assigns the identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFriendship {
    /// Sender.
    pub from_user_id: UserId,
    /// Recipient.
    pub to_user_id: UserId,
    /// Send time.
    pub created_at: DateTime<Utc>,
}

/// Whom a friend request is addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FriendTarget {
    /// Addressed by user id.
    Id(UserId),
    /// Addressed by username.
    Username(Username),
}

/// Incoming pending request with the requester resolved to a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFriendRequest {
    /// Relationship identifier, used to accept or reject.
    pub id: FriendshipId,
    /// Profile of the sender.
    pub requester: User,
    /// When the request was sent.
    pub created_at: DateTime<Utc>,
}

/// Accepted relationship resolved to the other party's profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Friend {
    /// Identifier of the accepted relationship.
    pub relationship_id: FriendshipId,
    /// Profile of the other party.
    pub friend: User,
    /// When the friendship began.
    pub since: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn friendship(from: &UserId, to: &UserId) -> Friendship {
        Friendship {
            id: FriendshipId::new(1),
            from_user_id: from.clone(),
            to_user_id: to.clone(),
            status: FriendshipStatus::Accepted,
            created_at: Utc::now(),
            responded_at: None,
        }
    }

    #[rstest]
    #[case(FriendshipStatus::Pending)]
    #[case(FriendshipStatus::Accepted)]
    #[case(FriendshipStatus::Rejected)]
    fn status_parses_its_own_spelling(#[case] status: FriendshipStatus) {
        assert_eq!(status.as_str().parse::<FriendshipStatus>(), Ok(status));
    }

    #[rstest]
    fn unknown_status_is_an_error() {
        assert!("blocked".parse::<FriendshipStatus>().is_err());
    }

    #[rstest]
    fn other_party_resolves_both_directions() {
        let a = UserId::random();
        let b = UserId::random();
        let stranger = UserId::random();
        let relationship = friendship(&a, &b);
        assert_eq!(relationship.other_party(&a), Some(&b));
        assert_eq!(relationship.other_party(&b), Some(&a));
        assert_eq!(relationship.other_party(&stranger), None);
    }

    #[rstest]
    fn rejected_is_not_active() {
        assert!(FriendshipStatus::Pending.is_active());
        assert!(FriendshipStatus::Accepted.is_active());
        assert!(!FriendshipStatus::Rejected.is_active());
    }
}
