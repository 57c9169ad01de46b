//! End-to-end registration, login, session status and logout over the
//! in-memory adapters.

mod support;

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use rstest::rstest;
use serde_json::{Value, json};

use support::{PASSWORD, backend, get, login, post, register, registration, send, sign_up};

#[rstest]
#[actix_rt::test]
async fn register_login_status_logout_round_trip() {
    let backend = backend();
    let state = backend.http_state();

    let (cookie, id) = sign_up(&state, "henrietta").await;
    assert!(!id.is_empty());

    let status = get(&state, "/api/auth/status", &cookie).await;
    assert_eq!(status.body["data"]["user"]["username"], "henrietta");
    assert_eq!(status.body["data"]["user"]["email"], "henrietta@farm.com");

    let logout = post(&state, "/api/logout", &cookie, json!({})).await;
    assert_eq!(logout.status, StatusCode::OK);
    assert_eq!(logout.body["message"], "Logged out successfully");

    let after = get(&state, "/api/auth/status", &cookie).await;
    assert_eq!(after.body["data"]["user"], Value::Null);
    let dashboard = get(&state, "/api/dashboard", &cookie).await;
    assert_eq!(dashboard.status, StatusCode::UNAUTHORIZED);
}

#[rstest]
#[case("1234567", StatusCode::BAD_REQUEST)]
#[case("12345678", StatusCode::CREATED)]
#[actix_rt::test]
async fn password_length_boundary(#[case] password: &str, #[case] expected: StatusCode) {
    let backend = backend();
    let state = backend.http_state();

    let reply = send(
        &state,
        TestRequest::post()
            .uri("/api/register")
            .set_json(registration("boundary", password)),
    )
    .await;

    assert_eq!(reply.status, expected, "{}", reply.body);
    if expected == StatusCode::BAD_REQUEST {
        assert!(reply.body["errors"]["password"].is_string());
    } else {
        assert_eq!(reply.body["data"], Value::Null);
    }
}

#[rstest]
#[actix_rt::test]
async fn registration_collects_every_field_error() {
    let backend = backend();
    let state = backend.http_state();

    let reply = send(
        &state,
        TestRequest::post().uri("/api/register").set_json(json!({
            "username": "",
            "firstname": "",
            "lastname": "",
            "email": "not-an-email",
            "password": "",
        })),
    )
    .await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["message"], "Validation failed");
    assert_eq!(reply.body["errors"]["username"], "Username is required");
    assert_eq!(reply.body["errors"]["email"], "Invalid email format");
    assert_eq!(reply.body["errors"]["password"], "Password is required");
}

#[rstest]
#[actix_rt::test]
async fn duplicate_email_is_a_conflict() {
    let backend = backend();
    let state = backend.http_state();
    assert_eq!(register(&state, "henrietta").await.status, StatusCode::CREATED);

    let mut clash = registration("another", PASSWORD);
    clash["email"] = json!("HENRIETTA@farm.com");
    let reply = send(
        &state,
        TestRequest::post().uri("/api/register").set_json(clash),
    )
    .await;

    assert_eq!(reply.status, StatusCode::CONFLICT);
    assert_eq!(reply.body["code"], "conflict");
    assert_eq!(reply.body["errors"]["email"], "Email is already registered");
}

#[rstest]
#[actix_rt::test]
async fn duplicate_username_is_a_conflict() {
    let backend = backend();
    let state = backend.http_state();
    assert_eq!(register(&state, "henrietta").await.status, StatusCode::CREATED);

    let mut clash = registration("henrietta", PASSWORD);
    clash["email"] = json!("other@farm.com");
    let reply = send(
        &state,
        TestRequest::post().uri("/api/register").set_json(clash),
    )
    .await;

    assert_eq!(reply.status, StatusCode::CONFLICT);
    assert_eq!(reply.body["errors"]["username"], "Username is already taken");
}

#[rstest]
#[actix_rt::test]
async fn wrong_password_and_unknown_email_look_identical() {
    let backend = backend();
    let state = backend.http_state();
    assert_eq!(register(&state, "henrietta").await.status, StatusCode::CREATED);

    let wrong_password = send(
        &state,
        TestRequest::post()
            .uri("/api/login")
            .set_json(json!({"email": "henrietta@farm.com", "password": "not-the-one"})),
    )
    .await;
    let unknown_email = send(
        &state,
        TestRequest::post()
            .uri("/api/login")
            .set_json(json!({"email": "nobody@farm.com", "password": PASSWORD})),
    )
    .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body["message"], unknown_email.body["message"]);
    assert!(wrong_password.session.is_none());
}

#[rstest]
#[actix_rt::test]
async fn sessions_expire_after_fixed_ttl() {
    let backend = backend();
    let state = backend.http_state();
    let (cookie, _) = sign_up(&state, "henrietta").await;

    backend.clock.advance_seconds(3_599);
    assert_eq!(get(&state, "/api/eggcount", &cookie).await.status, StatusCode::OK);

    backend.clock.advance_seconds(1);
    let expired = get(&state, "/api/eggcount", &cookie).await;
    assert_eq!(expired.status, StatusCode::UNAUTHORIZED);
    assert_eq!(expired.body["message"], "Unauthorized. Please log in.");
}

#[rstest]
#[actix_rt::test]
async fn logging_in_again_retires_the_presented_handle() {
    let backend = backend();
    let state = backend.http_state();
    let (first, _) = sign_up(&state, "henrietta").await;

    let second = send(
        &state,
        TestRequest::post()
            .uri("/api/login")
            .cookie(first.clone())
            .set_json(json!({"email": "henrietta@farm.com", "password": PASSWORD})),
    )
    .await
    .session
    .expect("new cookie");

    assert_ne!(first.value(), second.value());
    assert_eq!(
        get(&state, "/api/dashboard", &first).await.status,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(get(&state, "/api/dashboard", &second).await.status, StatusCode::OK);
}

#[rstest]
#[actix_rt::test]
async fn dashboard_without_cookie_never_touches_session_storage() {
    let backend = backend();
    let state = backend.http_state();

    let reply = send(&state, TestRequest::get().uri("/api/dashboard")).await;

    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.body["status"], 401);
    assert_eq!(backend.sessions.calls(), 0);
}

#[rstest]
#[actix_rt::test]
async fn login_cookie_is_http_only() {
    let backend = backend();
    let state = backend.http_state();
    assert_eq!(register(&state, "henrietta").await.status, StatusCode::CREATED);

    let cookie = login(&state, "henrietta").await;

    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.value().len(), 64);
}

#[rstest]
#[actix_rt::test]
async fn unknown_routes_answer_with_an_envelope() {
    let backend = backend();
    let state = backend.http_state();

    let reply = send(&state, TestRequest::get().uri("/api/coop")).await;

    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body["data"], Value::Null);
    assert_eq!(reply.body["code"], "not_found");
    assert!(reply.body["traceId"].is_string());
}
