//! Dashboard summary for the signed-in user.

use actix_web::{HttpResponse, get, web};
use futures_util::try_join;

use super::ApiResult;
use super::dto::{Dashboard, EggEntryBody, UserProfile};
use super::envelope::{Envelope, ErrorEnvelope, ok};
use super::session::Authenticated;
use super::state::HttpState;

/// Number of ledger entries shown on the dashboard.
pub const RECENT_ENTRIES: usize = 5;

/// Profile, running total and the most recent ledger entries.
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Dashboard data", body = Envelope<Dashboard>),
        (status = 401, description = "Not signed in", body = ErrorEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope),
        (status = 503, description = "Storage unavailable", body = ErrorEnvelope)
    ),
    tags = ["dashboard"],
    operation_id = "dashboard"
)]
#[get("/dashboard")]
pub async fn dashboard(
    state: web::Data<HttpState>,
    auth: Authenticated,
) -> ApiResult<HttpResponse> {
    let (user, total, recent) = try_join!(
        state.identity.get_by_id(&auth.user_id),
        state.eggs.total(&auth.user_id),
        state.eggs.recent(&auth.user_id, RECENT_ENTRIES),
    )?;
    let data = Dashboard {
        user: UserProfile::from(&user),
        total_eggs: total,
        recent_entries: recent.iter().map(EggEntryBody::from).collect(),
    };
    Ok(ok("Dashboard data retrieved successfully", data))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;
    use chrono::Utc;
    use mockall::predicate::{always, eq};
    use rstest::rstest;

    use super::super::test_utils::{MockPorts, body_json, call, sample_user, session_cookie};
    use super::*;
    use crate::domain::{EggEntry, EggEntryId, Error, UNAUTHENTICATED};

    #[rstest]
    #[actix_web::test]
    async fn missing_cookie_is_rejected_before_any_port_is_called() {
        let mut ports = MockPorts::default();
        ports.sessions.expect_resolve().never();
        ports.identity.expect_get_by_id().never();
        ports.eggs.expect_total().never();
        ports.eggs.expect_recent().never();

        let res = call(ports, TestRequest::get().uri("/api/dashboard")).await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(res).await;
        assert_eq!(body["message"], UNAUTHENTICATED);
        assert_eq!(body["code"], "unauthorized");
    }

    #[rstest]
    #[actix_web::test]
    async fn expired_session_never_reaches_the_ledger() {
        let mut ports = MockPorts::default();
        ports
            .sessions
            .expect_resolve()
            .returning(|_| Err(Error::unauthorized(UNAUTHENTICATED)));
        ports.eggs.expect_total().never();

        let handle = crate::domain::SessionHandle::generate();
        let res = call(
            ports,
            TestRequest::get()
                .uri("/api/dashboard")
                .cookie(session_cookie(&handle)),
        )
        .await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[actix_web::test]
    async fn dashboard_combines_profile_total_and_recent_entries() {
        let user = sample_user("hen");
        let user_id = user.id().clone();
        let entry = EggEntry {
            id: EggEntryId::new(9),
            user_id: user_id.clone(),
            amount: 4,
            reverses: None,
            created_at: Utc::now(),
        };

        let mut ports = MockPorts::default();
        let handle = ports.sign_in(&user_id);
        ports
            .identity
            .expect_get_by_id()
            .returning(move |_| Ok(user.clone()));
        ports.eggs.expect_total().returning(|_| Ok(12));
        ports
            .eggs
            .expect_recent()
            .with(always(), eq(RECENT_ENTRIES))
            .returning(move |_, _| Ok(vec![entry.clone()]));

        let res = call(
            ports,
            TestRequest::get()
                .uri("/api/dashboard")
                .cookie(session_cookie(&handle)),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert_eq!(body["message"], "Dashboard data retrieved successfully");
        assert_eq!(body["data"]["totalEggs"], 12);
        assert_eq!(body["data"]["user"]["username"], "hen");
        assert_eq!(body["data"]["recentEntries"][0]["id"], 9);
    }

    #[rstest]
    #[actix_web::test]
    async fn storage_failures_are_redacted() {
        let user = sample_user("hen");
        let user_id = user.id().clone();
        let mut ports = MockPorts::default();
        let handle = ports.sign_in(&user_id);
        ports
            .identity
            .expect_get_by_id()
            .returning(move |_| Ok(user.clone()));
        ports
            .eggs
            .expect_total()
            .returning(|_| Err(Error::internal("relation \"egg_entries\" does not exist")));
        ports.eggs.expect_recent().returning(|_, _| Ok(Vec::new()));

        let res = call(
            ports,
            TestRequest::get()
                .uri("/api/dashboard")
                .cookie(session_cookie(&handle)),
        )
        .await;

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(res).await;
        assert_eq!(body["message"], "Internal server error");
        assert!(!body.to_string().contains("egg_entries"));
    }
}
