//! Friend request endpoints.
//!
//! ```text
//! POST /api/friends/requests {"toUserId":"3fa85f64-5717-4562-b3fc-2c963f66afa6"}
//! GET /api/friends/requests
//! POST /api/friends/accept/7
//! POST /api/friends/reject/7
//! GET /api/friends
//! ```

use actix_web::{HttpResponse, get, post, web};

use super::ApiResult;
use super::dto::{FriendBody, FriendRequestBody, FriendshipBody, PendingRequestBody};
use super::envelope::{Envelope, ErrorEnvelope, created, ok};
use super::session::Authenticated;
use super::state::HttpState;
use super::validation::{friend_target_from, friendship_id_from};
use crate::domain::FriendDecision;

/// Send a friend request by user id or username.
#[utoipa::path(
    post,
    path = "/api/friends/requests",
    request_body = FriendRequestBody,
    responses(
        (status = 201, description = "Request created", body = Envelope<FriendshipBody>),
        (status = 400, description = "Invalid target", body = ErrorEnvelope),
        (status = 401, description = "Not signed in", body = ErrorEnvelope),
        (status = 404, description = "Unknown user", body = ErrorEnvelope),
        (status = 409, description = "Relationship already active", body = ErrorEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope)
    ),
    tags = ["friends"],
    operation_id = "sendFriendRequest"
)]
#[post("/friends/requests")]
pub async fn send_friend_request(
    state: web::Data<HttpState>,
    auth: Authenticated,
    payload: web::Json<FriendRequestBody>,
) -> ApiResult<HttpResponse> {
    let target = friend_target_from(&payload)?;
    let friendship = state.friends.send_request(&auth.user_id, target).await?;
    Ok(created("Friend request sent", FriendshipBody::from(&friendship)))
}

/// Pending requests addressed to the caller, oldest first.
#[utoipa::path(
    get,
    path = "/api/friends/requests",
    responses(
        (status = 200, description = "Pending requests", body = Envelope<Vec<PendingRequestBody>>),
        (status = 401, description = "Not signed in", body = ErrorEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope)
    ),
    tags = ["friends"],
    operation_id = "pendingFriendRequests"
)]
#[get("/friends/requests")]
pub async fn pending_requests(
    state: web::Data<HttpState>,
    auth: Authenticated,
) -> ApiResult<HttpResponse> {
    let pending = state.friends.pending_incoming(&auth.user_id).await?;
    let data: Vec<PendingRequestBody> = pending.iter().map(PendingRequestBody::from).collect();
    Ok(ok("Pending friend requests retrieved successfully", data))
}

/// Accept a pending request addressed to the caller.
#[utoipa::path(
    post,
    path = "/api/friends/accept/{id}",
    params(("id" = i64, Path, description = "Friend request id")),
    responses(
        (status = 200, description = "Request accepted", body = Envelope<FriendshipBody>),
        (status = 400, description = "Invalid request id", body = ErrorEnvelope),
        (status = 401, description = "Not signed in", body = ErrorEnvelope),
        (status = 403, description = "Caller is not the recipient", body = ErrorEnvelope),
        (status = 404, description = "No such pending request", body = ErrorEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope)
    ),
    tags = ["friends"],
    operation_id = "acceptFriendRequest"
)]
#[post("/friends/accept/{id}")]
pub async fn accept_request(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    respond(&state, &auth, path.into_inner(), FriendDecision::Accept).await
}

/// Reject a pending request addressed to the caller.
#[utoipa::path(
    post,
    path = "/api/friends/reject/{id}",
    params(("id" = i64, Path, description = "Friend request id")),
    responses(
        (status = 200, description = "Request rejected", body = Envelope<FriendshipBody>),
        (status = 400, description = "Invalid request id", body = ErrorEnvelope),
        (status = 401, description = "Not signed in", body = ErrorEnvelope),
        (status = 403, description = "Caller is not the recipient", body = ErrorEnvelope),
        (status = 404, description = "No such pending request", body = ErrorEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope)
    ),
    tags = ["friends"],
    operation_id = "rejectFriendRequest"
)]
#[post("/friends/reject/{id}")]
pub async fn reject_request(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    respond(&state, &auth, path.into_inner(), FriendDecision::Reject).await
}

async fn respond(
    state: &HttpState,
    auth: &Authenticated,
    raw_id: i64,
    decision: FriendDecision,
) -> ApiResult<HttpResponse> {
    let id = friendship_id_from(raw_id)?;
    let (friendship, message) = match decision {
        FriendDecision::Accept => (
            state.friends.accept(id, &auth.user_id).await?,
            "Friend request accepted",
        ),
        FriendDecision::Reject => (
            state.friends.reject(id, &auth.user_id).await?,
            "Friend request rejected",
        ),
    };
    Ok(ok(message, FriendshipBody::from(&friendship)))
}

/// Accepted friends of the caller, whichever side sent the request.
#[utoipa::path(
    get,
    path = "/api/friends",
    responses(
        (status = 200, description = "Friends", body = Envelope<Vec<FriendBody>>),
        (status = 401, description = "Not signed in", body = ErrorEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope)
    ),
    tags = ["friends"],
    operation_id = "listFriends"
)]
#[get("/friends")]
pub async fn list_friends(
    state: web::Data<HttpState>,
    auth: Authenticated,
) -> ApiResult<HttpResponse> {
    let friends = state.friends.accepted(&auth.user_id).await?;
    let data: Vec<FriendBody> = friends.iter().map(FriendBody::from).collect();
    Ok(ok("Friends retrieved successfully", data))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;
    use chrono::Utc;
    use mockall::predicate::{always, eq};
    use rstest::rstest;
    use serde_json::json;

    use super::super::test_utils::{
        AdapterInfoEvents, MockPorts, body_json, call, sample_user, session_cookie,
    };
    use crate::domain::{
        Error, Friend, FriendTarget, Friendship, FriendshipId, FriendshipStatus,
        PendingFriendRequest, REQUEST_NOT_FOUND, UserId,
    };

    fn friendship(from: &UserId, to: &UserId, status: FriendshipStatus) -> Friendship {
        Friendship {
            id: FriendshipId::new(7),
            from_user_id: from.clone(),
            to_user_id: to.clone(),
            status,
            created_at: Utc::now(),
            responded_at: None,
        }
    }

    #[rstest]
    #[actix_web::test]
    async fn sending_by_username_creates_pending_request() {
        let me = UserId::random();
        let them = UserId::random();
        let stored = friendship(&me, &them, FriendshipStatus::Pending);
        let mut ports = MockPorts::default();
        let handle = ports.sign_in(&me);
        ports
            .friends
            .expect_send_request()
            .withf(|_, target| {
                matches!(target, FriendTarget::Username(name) if name.as_str() == "rooster")
            })
            .times(1)
            .returning(move |_, _| Ok(stored.clone()));

        let (events, _guard) = AdapterInfoEvents::capture();
        let res = call(
            ports,
            TestRequest::post()
                .uri("/api/friends/requests")
                .cookie(session_cookie(&handle))
                .set_json(json!({"username": "rooster"})),
        )
        .await;

        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(events.count(), 0, "the friend graph service logs the request");
        let body = body_json(res).await;
        assert_eq!(body["status"], 201);
        assert_eq!(body["message"], "Friend request sent");
        assert_eq!(body["data"]["status"], "pending");
        assert_eq!(body["data"]["toUserId"], them.to_string());
    }

    #[rstest]
    #[actix_web::test]
    async fn legacy_to_user_id_spelling_is_accepted() {
        let me = UserId::random();
        let them = UserId::random();
        let expected = FriendTarget::Id(them.clone());
        let stored = friendship(&me, &them, FriendshipStatus::Pending);
        let mut ports = MockPorts::default();
        let handle = ports.sign_in(&me);
        ports
            .friends
            .expect_send_request()
            .with(always(), eq(expected))
            .returning(move |_, _| Ok(stored.clone()));

        let res = call(
            ports,
            TestRequest::post()
                .uri("/api/friends/requests")
                .cookie(session_cookie(&handle))
                .set_json(json!({"toUserID": them.to_string()})),
        )
        .await;

        assert_eq!(res.status(), StatusCode::CREATED);
    }

    #[rstest]
    #[actix_web::test]
    async fn duplicate_requests_are_conflicts() {
        let me = UserId::random();
        let mut ports = MockPorts::default();
        let handle = ports.sign_in(&me);
        ports
            .friends
            .expect_send_request()
            .returning(|_, _| Err(Error::conflict("Friend request already exists")));

        let res = call(
            ports,
            TestRequest::post()
                .uri("/api/friends/requests")
                .cookie(session_cookie(&handle))
                .set_json(json!({"username": "rooster"})),
        )
        .await;

        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[rstest]
    #[actix_web::test]
    async fn pending_requests_expose_requester_profiles() {
        let me = UserId::random();
        let pending = PendingFriendRequest {
            id: FriendshipId::new(3),
            requester: sample_user("rooster"),
            created_at: Utc::now(),
        };
        let mut ports = MockPorts::default();
        let handle = ports.sign_in(&me);
        ports
            .friends
            .expect_pending_incoming()
            .returning(move |_| Ok(vec![pending.clone()]));

        let res = call(
            ports,
            TestRequest::get()
                .uri("/api/friends/requests")
                .cookie(session_cookie(&handle)),
        )
        .await;

        let body = body_json(res).await;
        assert_eq!(body["data"][0]["id"], 3);
        assert_eq!(body["data"][0]["requester"]["username"], "rooster");
    }

    #[rstest]
    #[actix_web::test]
    async fn accepting_transitions_to_accepted() {
        let me = UserId::random();
        let them = UserId::random();
        let accepted = friendship(&them, &me, FriendshipStatus::Accepted);
        let mut ports = MockPorts::default();
        let handle = ports.sign_in(&me);
        ports
            .friends
            .expect_accept()
            .with(eq(FriendshipId::new(7)), eq(me.clone()))
            .returning(move |_, _| Ok(accepted.clone()));
        ports.friends.expect_reject().never();

        let res = call(
            ports,
            TestRequest::post()
                .uri("/api/friends/accept/7")
                .cookie(session_cookie(&handle)),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert_eq!(body["message"], "Friend request accepted");
        assert_eq!(body["data"]["status"], "accepted");
    }

    #[rstest]
    #[actix_web::test]
    async fn non_recipient_cannot_reject() {
        let me = UserId::random();
        let mut ports = MockPorts::default();
        let handle = ports.sign_in(&me);
        ports
            .friends
            .expect_reject()
            .returning(|_, _| Err(Error::forbidden(REQUEST_NOT_FOUND)));

        let res = call(
            ports,
            TestRequest::post()
                .uri("/api/friends/reject/7")
                .cookie(session_cookie(&handle)),
        )
        .await;

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(res).await["message"], REQUEST_NOT_FOUND);
    }

    #[rstest]
    #[actix_web::test]
    async fn friends_list_resolves_other_party() {
        let me = UserId::random();
        let friend = Friend {
            relationship_id: FriendshipId::new(7),
            friend: sample_user("rooster"),
            since: Utc::now(),
        };
        let mut ports = MockPorts::default();
        let handle = ports.sign_in(&me);
        ports
            .friends
            .expect_accepted()
            .returning(move |_| Ok(vec![friend.clone()]));

        let res = call(
            ports,
            TestRequest::get()
                .uri("/api/friends")
                .cookie(session_cookie(&handle)),
        )
        .await;

        let body = body_json(res).await;
        assert_eq!(body["message"], "Friends retrieved successfully");
        assert_eq!(body["data"][0]["relationshipId"], 7);
        assert_eq!(body["data"][0]["friend"]["username"], "rooster");
    }
}
