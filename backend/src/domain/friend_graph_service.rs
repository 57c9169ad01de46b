//! Friend graph domain service.
//!
//! Accept and reject are conditional writes: the store only moves a request
//! that is still pending and addressed to the actor, so of two racing
//! decisions exactly one wins and the other sees `not_found`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    FriendGraph, FriendshipRepository, FriendshipRepositoryError, UserRepository,
    UserRepositoryError,
};
use crate::domain::{
    Error, Friend, FriendDecision, FriendTarget, Friendship, FriendshipId, FriendshipStatus,
    NewFriendship, PendingFriendRequest, StorageDeadline, User, UserId,
};

/// Shared by "no such request" and "request addressed to someone else".
pub const REQUEST_NOT_FOUND: &str = "Friend request not found";

const ALREADY_RELATED: &str = "A friend request already exists between these users";

fn map_friendship_error(error: FriendshipRepositoryError) -> Error {
    match error {
        FriendshipRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("friendship repository unavailable: {message}"))
        }
        FriendshipRepositoryError::Query { message } => {
            Error::internal(format!("friendship repository error: {message}"))
        }
        FriendshipRepositoryError::ActiveRelationshipExists => Error::conflict(ALREADY_RELATED),
    }
}

fn map_user_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        other => Error::internal(format!("user repository error: {other}")),
    }
}

fn self_request() -> Error {
    Error::invalid_request("You cannot send a friend request to yourself")
}

/// Friend graph service implementing the [`FriendGraph`] driving port.
#[derive(Clone)]
pub struct FriendGraphService<F, U> {
    friendships: Arc<F>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
    deadline: StorageDeadline,
}

impl<F, U> FriendGraphService<F, U> {
    /// Create a new friend graph service.
    #[must_use]
    pub fn new(
        friendships: Arc<F>,
        users: Arc<U>,
        clock: Arc<dyn Clock>,
        deadline: StorageDeadline,
    ) -> Self {
        Self {
            friendships,
            users,
            clock,
            deadline,
        }
    }
}

impl<F, U> FriendGraphService<F, U>
where
    F: FriendshipRepository,
    U: UserRepository,
{
    async fn resolve_target(&self, target: FriendTarget) -> Result<User, Error> {
        let found = match target {
            FriendTarget::Id(id) => {
                self.deadline
                    .bound("users.find_by_id", self.users.find_by_id(&id))
                    .await?
            }
            FriendTarget::Username(username) => {
                self.deadline
                    .bound("users.find_by_username", self.users.find_by_username(&username))
                    .await?
            }
        };
        found
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("User not found"))
    }

    async fn profiles_by_id(&self, ids: &[UserId]) -> Result<HashMap<UserId, User>, Error> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let users = self
            .deadline
            .bound("users.find_by_ids", self.users.find_by_ids(ids))
            .await?
            .map_err(map_user_error)?;
        Ok(users
            .into_iter()
            .map(|user| (user.id().clone(), user))
            .collect())
    }

    async fn decide(
        &self,
        id: FriendshipId,
        actor: &UserId,
        decision: FriendDecision,
    ) -> Result<Friendship, Error> {
        let existing = self
            .deadline
            .bound("friendships.find_by_id", self.friendships.find_by_id(id))
            .await?
            .map_err(map_friendship_error)?
            .ok_or_else(|| Error::not_found(REQUEST_NOT_FOUND))?;

        if &existing.to_user_id != actor {
            return Err(Error::forbidden(REQUEST_NOT_FOUND));
        }
        if existing.status != FriendshipStatus::Pending {
            return Err(Error::not_found(REQUEST_NOT_FOUND));
        }

        let status = decision.target_status();
        let updated = self
            .deadline
            .bound(
                "friendships.transition_pending",
                self.friendships
                    .transition_pending(id, actor, status, self.clock.utc()),
            )
            .await?
            .map_err(map_friendship_error)?
            .ok_or_else(|| Error::not_found(REQUEST_NOT_FOUND))?;

        info!(friendship_id = %id, %status, "friend request answered");
        Ok(updated)
    }
}

#[async_trait]
impl<F, U> FriendGraph for FriendGraphService<F, U>
where
    F: FriendshipRepository,
    U: UserRepository,
{
    async fn send_request(
        &self,
        from: &UserId,
        target: FriendTarget,
    ) -> Result<Friendship, Error> {
        if matches!(&target, FriendTarget::Id(id) if id == from) {
            return Err(self_request());
        }
        let recipient = self.resolve_target(target).await?;
        let to = recipient.id();
        if to == from {
            return Err(self_request());
        }

        let existing = self
            .deadline
            .bound(
                "friendships.find_active_between",
                self.friendships.find_active_between(from, to),
            )
            .await?
            .map_err(map_friendship_error)?;
        if existing.is_some() {
            return Err(Error::conflict(ALREADY_RELATED));
        }

        let request = NewFriendship {
            from_user_id: from.clone(),
            to_user_id: to.clone(),
            created_at: self.clock.utc(),
        };
        let created = self
            .deadline
            .bound(
                "friendships.create_pending",
                self.friendships.create_pending(&request),
            )
            .await?
            .map_err(map_friendship_error)?;

        info!(friendship_id = %created.id, from = %from, to = %to, "friend request sent");
        Ok(created)
    }

    async fn accept(&self, id: FriendshipId, actor: &UserId) -> Result<Friendship, Error> {
        self.decide(id, actor, FriendDecision::Accept).await
    }

    async fn reject(&self, id: FriendshipId, actor: &UserId) -> Result<Friendship, Error> {
        self.decide(id, actor, FriendDecision::Reject).await
    }

    async fn pending_incoming(&self, user_id: &UserId) -> Result<Vec<PendingFriendRequest>, Error> {
        let pending = self
            .deadline
            .bound(
                "friendships.list_pending_incoming",
                self.friendships.list_pending_incoming(user_id),
            )
            .await?
            .map_err(map_friendship_error)?;

        let requester_ids: Vec<UserId> = pending.iter().map(|f| f.from_user_id.clone()).collect();
        let profiles = self.profiles_by_id(&requester_ids).await?;

        Ok(pending
            .into_iter()
            .filter_map(|friendship| match profiles.get(&friendship.from_user_id) {
                Some(requester) => Some(PendingFriendRequest {
                    id: friendship.id,
                    requester: requester.clone(),
                    created_at: friendship.created_at,
                }),
                None => {
                    warn!(friendship_id = %friendship.id, "requester profile missing");
                    None
                }
            })
            .collect())
    }

    async fn accepted(&self, user_id: &UserId) -> Result<Vec<Friend>, Error> {
        let accepted = self
            .deadline
            .bound(
                "friendships.list_accepted_for",
                self.friendships.list_accepted_for(user_id),
            )
            .await?
            .map_err(map_friendship_error)?;

        let friend_ids: Vec<UserId> = accepted
            .iter()
            .filter_map(|f| f.other_party(user_id).cloned())
            .collect();
        let profiles = self.profiles_by_id(&friend_ids).await?;

        let mut seen = HashSet::new();
        let mut friends = Vec::with_capacity(accepted.len());
        for friendship in accepted {
            let Some(other) = friendship.other_party(user_id) else {
                continue;
            };
            if !seen.insert(other.clone()) {
                continue;
            }
            match profiles.get(other) {
                Some(friend) => friends.push(Friend {
                    relationship_id: friendship.id,
                    friend: friend.clone(),
                    since: friendship.since(),
                }),
                None => warn!(friendship_id = %friendship.id, "friend profile missing"),
            }
        }
        Ok(friends)
    }
}

#[cfg(test)]
#[path = "friend_graph_service_tests.rs"]
mod tests;
