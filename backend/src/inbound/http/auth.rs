//! Registration, login, logout and session status.
//!
//! ```text
//! POST /api/register {"username":"hen","firstname":"Henrietta","lastname":"Layer","email":"hen@farm.com","password":"s3cret-eggs"}
//! POST /api/login {"email":"hen@farm.com","password":"s3cret-eggs"}
//! POST /api/logout
//! GET /api/auth/status
//! ```

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, get, post, web};
use tracing::warn;

use super::ApiResult;
use super::dto::{LoginRequest, RegisterRequest, SessionUser, UserProfile};
use super::envelope::{Envelope, ErrorEnvelope, message_only, ok};
use super::schemas::MessageEnvelopeSchema;
use super::session::PresentedSession;
use super::state::HttpState;
use super::validation::{login_from, registration_from};
use crate::domain::{Error, ErrorCode, SessionHandle};

/// Create an account.
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = MessageEnvelopeSchema),
        (status = 400, description = "Validation failed", body = ErrorEnvelope),
        (status = 409, description = "Username or email already in use", body = ErrorEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration = registration_from(&payload)?;
    let user = state.identity.register(registration).await?;
    Ok(message_only(StatusCode::CREATED, "User registered successfully"))
}

/// Authenticate and establish a session.
///
/// A handle the client already presented is revoked first so a planted
/// cookie cannot survive login.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = Envelope<SessionUser>,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Validation failed", body = ErrorEnvelope),
        (status = 401, description = "Invalid credentials", body = ErrorEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    presented: PresentedSession,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = login_from(&payload)?;
    let user = state.identity.authenticate(credentials).await?;
    if let Some(previous) = presented.0 {
        revoke_replaced(&state, &previous).await;
    }
    let handle = state.sessions.establish(user.id()).await?;

    let body = Envelope::new(
        StatusCode::OK,
        "Login successful",
        Some(SessionUser {
            user: Some(UserProfile::from(&user)),
        }),
    );
    Ok(HttpResponse::Ok()
        .cookie(state.cookies.issue(&handle))
        .json(body))
}

async fn revoke_replaced(state: &HttpState, previous: &SessionHandle) {
    if let Err(err) = state.sessions.destroy(previous).await {
        warn!(
            session = %previous.fingerprint(),
            error = %err,
            "failed to revoke replaced session"
        );
    }
}

/// Destroy the current session, if any, and clear the cookie.
#[utoipa::path(
    post,
    path = "/api/logout",
    responses(
        (status = 200, description = "Logged out", body = MessageEnvelopeSchema),
        (status = 500, description = "Internal server error", body = ErrorEnvelope)
    ),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(
    state: web::Data<HttpState>,
    presented: PresentedSession,
) -> ApiResult<HttpResponse> {
    if let Some(handle) = presented.0 {
        state.sessions.destroy(&handle).await?;
    }
    let body = Envelope::<()>::new(StatusCode::OK, "Logged out successfully", None);
    Ok(HttpResponse::Ok().cookie(state.cookies.clear()).json(body))
}

/// Report the signed-in user, or `null` when there is none.
#[utoipa::path(
    get,
    path = "/api/auth/status",
    responses(
        (status = 200, description = "Session status", body = Envelope<SessionUser>),
        (status = 500, description = "Internal server error", body = ErrorEnvelope)
    ),
    tags = ["auth"],
    operation_id = "authStatus",
    security([])
)]
#[get("/auth/status")]
pub async fn auth_status(
    state: web::Data<HttpState>,
    presented: PresentedSession,
) -> ApiResult<HttpResponse> {
    let user = match presented.0 {
        Some(handle) => signed_in_user(&state, &handle).await?,
        None => None,
    };
    Ok(ok("Authentication status", SessionUser { user }))
}

async fn signed_in_user(
    state: &HttpState,
    handle: &SessionHandle,
) -> Result<Option<UserProfile>, Error> {
    let user_id = match state.sessions.resolve(handle).await {
        Ok(user_id) => user_id,
        Err(err) if err.code() == ErrorCode::Unauthorized => return Ok(None),
        Err(err) => return Err(err),
    };
    match state.identity.get_by_id(&user_id).await {
        Ok(user) => Ok(Some(UserProfile::from(&user))),
        Err(err) if err.code() == ErrorCode::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;
    use mockall::predicate::eq;
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::super::session::SESSION_COOKIE;
    use super::super::test_utils::{
        AdapterInfoEvents, MockPorts, body_json, call, sample_user, session_cookie,
    };
    use super::*;
    use crate::domain::{FieldErrors, INVALID_CREDENTIALS, UNAUTHENTICATED};

    fn registration_body(password: &str) -> Value {
        json!({
            "username": "hen",
            "firstname": "Henrietta",
            "lastname": "Layer",
            "email": "hen@farm.com",
            "password": password,
        })
    }

    #[rstest]
    #[actix_web::test]
    async fn register_returns_created_envelope_without_data() {
        let mut ports = MockPorts::default();
        ports
            .identity
            .expect_register()
            .times(1)
            .returning(|_| Ok(sample_user("hen")));

        let res = call(
            ports,
            TestRequest::post()
                .uri("/api/register")
                .set_json(registration_body("s3cret-eggs")),
        )
        .await;

        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(
            body_json(res).await,
            json!({"data": null, "message": "User registered successfully", "status": 201})
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn register_rejects_short_password_before_touching_the_store() {
        let mut ports = MockPorts::default();
        ports.identity.expect_register().never();

        let res = call(
            ports,
            TestRequest::post()
                .uri("/api/register")
                .set_json(registration_body("1234567")),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = body_json(res).await;
        assert_eq!(body["code"], "invalid_request");
        assert_eq!(
            body["errors"]["password"],
            "Password must be at least 8 characters"
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn register_surfaces_conflicts_with_field_detail() {
        let mut ports = MockPorts::default();
        ports.identity.expect_register().returning(|_| {
            let errors: FieldErrors = [("email", "Email is already registered")]
                .into_iter()
                .collect();
            Err(Error::conflict("Email is already registered").with_field_errors(errors))
        });

        let res = call(
            ports,
            TestRequest::post()
                .uri("/api/register")
                .set_json(registration_body("s3cret-eggs")),
        )
        .await;

        assert_eq!(res.status(), StatusCode::CONFLICT);
        let body = body_json(res).await;
        assert_eq!(body["errors"]["email"], "Email is already registered");
        assert_eq!(body["data"], Value::Null);
    }

    #[rstest]
    #[actix_web::test]
    async fn login_sets_http_only_cookie_and_returns_profile() {
        let user = sample_user("hen");
        let user_id = user.id().clone();
        let handle = SessionHandle::generate();
        let issued = handle.clone();

        let mut ports = MockPorts::default();
        ports
            .identity
            .expect_authenticate()
            .returning(move |_| Ok(user.clone()));
        ports
            .sessions
            .expect_establish()
            .with(eq(user_id))
            .returning(move |_| Ok(issued.clone()));

        let (events, _guard) = AdapterInfoEvents::capture();
        let res = call(
            ports,
            TestRequest::post()
                .uri("/api/login")
                .set_json(json!({"email": "hen@farm.com", "password": "s3cret-eggs"})),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(events.count(), 0, "login success is logged by the identity service");
        let cookie = res
            .response()
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .expect("session cookie");
        assert_eq!(cookie.value(), handle.expose());
        assert_eq!(cookie.http_only(), Some(true));

        let body = body_json(res).await;
        assert_eq!(body["message"], "Login successful");
        assert_eq!(body["data"]["user"]["username"], "hen");
        assert!(body["data"]["user"].get("password").is_none());
    }

    #[rstest]
    #[actix_web::test]
    async fn login_revokes_previously_presented_handle() {
        let user = sample_user("hen");
        let stale = SessionHandle::generate();

        let mut ports = MockPorts::default();
        ports
            .identity
            .expect_authenticate()
            .returning(move |_| Ok(user.clone()));
        ports
            .sessions
            .expect_destroy()
            .with(eq(stale.clone()))
            .times(1)
            .returning(|_| Ok(()));
        ports
            .sessions
            .expect_establish()
            .returning(|_| Ok(SessionHandle::generate()));

        let res = call(
            ports,
            TestRequest::post()
                .uri("/api/login")
                .cookie(session_cookie(&stale))
                .set_json(json!({"email": "hen@farm.com", "password": "s3cret-eggs"})),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
    }

    #[rstest]
    #[actix_web::test]
    async fn login_with_bad_credentials_is_unauthorized() {
        let mut ports = MockPorts::default();
        ports
            .identity
            .expect_authenticate()
            .returning(|_| Err(Error::unauthorized(INVALID_CREDENTIALS)));
        ports.sessions.expect_establish().never();

        let res = call(
            ports,
            TestRequest::post()
                .uri("/api/login")
                .set_json(json!({"email": "hen@farm.com", "password": "wrong-pass"})),
        )
        .await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(res.response().cookies().next().is_none());
        assert_eq!(body_json(res).await["message"], INVALID_CREDENTIALS);
    }

    #[rstest]
    #[actix_web::test]
    async fn malformed_login_body_yields_envelope() {
        let res = call(
            MockPorts::default(),
            TestRequest::post()
                .uri("/api/login")
                .insert_header(("content-type", "application/json"))
                .set_payload("{not json"),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = body_json(res).await;
        assert_eq!(body["status"], 400);
        assert_eq!(body["code"], "invalid_request");
    }

    #[rstest]
    #[actix_web::test]
    async fn logout_without_session_still_clears_cookie() {
        let mut ports = MockPorts::default();
        ports.sessions.expect_destroy().never();

        let res = call(ports, TestRequest::post().uri("/api/logout")).await;

        assert_eq!(res.status(), StatusCode::OK);
        let cleared = res
            .response()
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .expect("clearing cookie");
        assert_eq!(cleared.value(), "");
        assert_eq!(body_json(res).await["message"], "Logged out successfully");
    }

    #[rstest]
    #[actix_web::test]
    async fn logout_destroys_presented_session() {
        let handle = SessionHandle::generate();
        let mut ports = MockPorts::default();
        ports
            .sessions
            .expect_destroy()
            .with(eq(handle.clone()))
            .times(1)
            .returning(|_| Ok(()));

        let res = call(
            ports,
            TestRequest::post()
                .uri("/api/logout")
                .cookie(session_cookie(&handle)),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
    }

    #[rstest]
    #[actix_web::test]
    async fn status_reports_null_user_without_cookie() {
        let res = call(MockPorts::default(), TestRequest::get().uri("/api/auth/status")).await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await["data"], json!({"user": null}));
    }

    #[rstest]
    #[actix_web::test]
    async fn status_reports_null_user_for_expired_session() {
        let handle = SessionHandle::generate();
        let mut ports = MockPorts::default();
        ports
            .sessions
            .expect_resolve()
            .returning(|_| Err(Error::unauthorized(UNAUTHENTICATED)));

        let res = call(
            ports,
            TestRequest::get()
                .uri("/api/auth/status")
                .cookie(session_cookie(&handle)),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await["data"]["user"], Value::Null);
    }

    #[rstest]
    #[actix_web::test]
    async fn status_reports_signed_in_profile() {
        let user = sample_user("hen");
        let mut ports = MockPorts::default();
        let handle = ports.sign_in(user.id());
        ports
            .identity
            .expect_get_by_id()
            .returning(move |_| Ok(user.clone()));

        let res = call(
            ports,
            TestRequest::get()
                .uri("/api/auth/status")
                .cookie(session_cookie(&handle)),
        )
        .await;

        assert_eq!(body_json(res).await["data"]["user"]["username"], "hen");
    }
}
