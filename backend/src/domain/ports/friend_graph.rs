//! Driving port for friend requests and friendships.

use async_trait::async_trait;

use crate::domain::{
    Error, Friend, FriendTarget, Friendship, FriendshipId, PendingFriendRequest, UserId,
};

/// Friend graph use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FriendGraph: Send + Sync {
    /// Send a pending request from `from` to `target`.
    async fn send_request(&self, from: &UserId, target: FriendTarget)
    -> Result<Friendship, Error>;

    /// Accept a pending request addressed to `actor`.
    async fn accept(&self, id: FriendshipId, actor: &UserId) -> Result<Friendship, Error>;

    /// Reject a pending request addressed to `actor`.
    async fn reject(&self, id: FriendshipId, actor: &UserId) -> Result<Friendship, Error>;

    /// Pending requests addressed to `user_id`, with requester profiles.
    async fn pending_incoming(&self, user_id: &UserId) -> Result<Vec<PendingFriendRequest>, Error>;

    /// Accepted friendships of `user_id`, resolved to the other party.
    async fn accepted(&self, user_id: &UserId) -> Result<Vec<Friend>, Error>;
}
