//! In-memory `FriendshipRepository`.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{FriendshipRepository, FriendshipRepositoryError};
use crate::domain::{Friendship, FriendshipId, FriendshipStatus, NewFriendship, UserId};

use super::POISONED;

#[derive(Debug, Default)]
struct GraphState {
    relationships: Vec<Friendship>,
    next_id: i64,
}

fn links(friendship: &Friendship, a: &UserId, b: &UserId) -> bool {
    (&friendship.from_user_id == a && &friendship.to_user_id == b)
        || (&friendship.from_user_id == b && &friendship.to_user_id == a)
}

/// Directed relationships with the active-pair rule checked under the lock.
#[derive(Debug, Default)]
pub struct InMemoryFriendshipRepository {
    state: Mutex<GraphState>,
}

impl InMemoryFriendshipRepository {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(
        &self,
        f: impl FnOnce(&mut GraphState) -> Result<T, FriendshipRepositoryError>,
    ) -> Result<T, FriendshipRepositoryError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| FriendshipRepositoryError::query(POISONED))?;
        f(&mut guard)
    }
}

#[async_trait]
impl FriendshipRepository for InMemoryFriendshipRepository {
    async fn create_pending(
        &self,
        request: &NewFriendship,
    ) -> Result<Friendship, FriendshipRepositoryError> {
        self.with_state(|state| {
            let clash = state.relationships.iter().any(|existing| {
                existing.status.is_active()
                    && links(existing, &request.from_user_id, &request.to_user_id)
            });
            if clash {
                return Err(FriendshipRepositoryError::active_relationship_exists());
            }
            state.next_id += 1;
            let stored = Friendship {
                id: FriendshipId::new(state.next_id),
                from_user_id: request.from_user_id.clone(),
                to_user_id: request.to_user_id.clone(),
                status: FriendshipStatus::Pending,
                created_at: request.created_at,
                responded_at: None,
            };
            state.relationships.push(stored.clone());
            Ok(stored)
        })
    }

    async fn find_active_between(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Option<Friendship>, FriendshipRepositoryError> {
        self.with_state(|state| {
            Ok(state
                .relationships
                .iter()
                .find(|f| f.status.is_active() && links(f, a, b))
                .cloned())
        })
    }

    async fn find_by_id(
        &self,
        id: FriendshipId,
    ) -> Result<Option<Friendship>, FriendshipRepositoryError> {
        self.with_state(|state| Ok(state.relationships.iter().find(|f| f.id == id).cloned()))
    }

    async fn transition_pending(
        &self,
        id: FriendshipId,
        recipient: &UserId,
        status: FriendshipStatus,
        responded_at: DateTime<Utc>,
    ) -> Result<Option<Friendship>, FriendshipRepositoryError> {
        self.with_state(|state| {
            let target = state.relationships.iter_mut().find(|f| {
                f.id == id && &f.to_user_id == recipient && f.status == FriendshipStatus::Pending
            });
            Ok(target.map(|friendship| {
                friendship.status = status;
                friendship.responded_at = Some(responded_at);
                friendship.clone()
            }))
        })
    }

    async fn list_pending_incoming(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Friendship>, FriendshipRepositoryError> {
        self.with_state(|state| {
            let mut pending: Vec<Friendship> = state
                .relationships
                .iter()
                .filter(|f| &f.to_user_id == user_id && f.status == FriendshipStatus::Pending)
                .cloned()
                .collect();
            pending.sort_by(|a, b| {
                a.created_at
                    .cmp(&b.created_at)
                    .then_with(|| a.id.get().cmp(&b.id.get()))
            });
            Ok(pending)
        })
    }

    async fn list_accepted_for(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Friendship>, FriendshipRepositoryError> {
        self.with_state(|state| {
            Ok(state
                .relationships
                .iter()
                .filter(|f| {
                    f.status == FriendshipStatus::Accepted
                        && (&f.from_user_id == user_id || &f.to_user_id == user_id)
                })
                .cloned()
                .collect())
        })
    }
}
