//! Port for directed friend relationships.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Friendship, FriendshipId, FriendshipStatus, NewFriendship, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by friendship repository adapters.
    pub enum FriendshipRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "friendship repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "friendship repository query failed: {message}",
        /// A pending or accepted relationship already links the pair.
        ActiveRelationshipExists => "an active relationship already exists for this pair",
    }
}

/// Storage of friend relationships.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FriendshipRepository: Send + Sync {
    /// Create a pending request. Fails with `ActiveRelationshipExists` when a
    /// pending or accepted relationship links the pair in either direction.
    async fn create_pending(
        &self,
        request: &NewFriendship,
    ) -> Result<Friendship, FriendshipRepositoryError>;

    /// Pending or accepted relationship between `a` and `b`, either direction.
    async fn find_active_between(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Option<Friendship>, FriendshipRepositoryError>;

    /// Fetch a relationship by id.
    async fn find_by_id(
        &self,
        id: FriendshipId,
    ) -> Result<Option<Friendship>, FriendshipRepositoryError>;

    /// Move a relationship out of `pending` only if it is still pending and
    /// addressed to `recipient`. Returns `None` when nothing matched.
    async fn transition_pending(
        &self,
        id: FriendshipId,
        recipient: &UserId,
        status: FriendshipStatus,
        responded_at: DateTime<Utc>,
    ) -> Result<Option<Friendship>, FriendshipRepositoryError>;

    /// Pending requests addressed to `user_id`, oldest first.
    async fn list_pending_incoming(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Friendship>, FriendshipRepositoryError>;

    /// Accepted relationships where `user_id` is either party.
    async fn list_accepted_for(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Friendship>, FriendshipRepositoryError>;
}
