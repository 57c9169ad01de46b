//! Shared helpers for the integration tests: drive the full `/api` scope
//! over the in-memory adapters.

use std::time::Duration;

use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use eggcounter::Trace;
use eggcounter::inbound::http::api_scope;
use eggcounter::inbound::http::session::SESSION_COOKIE;
use eggcounter::inbound::http::state::HttpState;
use eggcounter::test_support::InMemoryApp;
use serde_json::{Value, json};

/// Password every test account registers with.
pub const PASSWORD: &str = "s3cret-eggs";

/// Fresh in-memory backend whose sessions last an hour.
pub fn backend() -> InMemoryApp {
    InMemoryApp::new(Duration::from_secs(3_600)).expect("argon2 hasher")
}

/// What a test needs from one exchange.
#[derive(Debug)]
pub struct Reply {
    /// Response status.
    pub status: StatusCode,
    /// Session cookie set by the response, if any.
    pub session: Option<Cookie<'static>>,
    /// Decoded JSON envelope.
    pub body: Value,
}

/// Send `req` through a freshly initialised app sharing `state`.
pub async fn send(state: &HttpState, req: TestRequest) -> Reply {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Trace)
            .service(api_scope()),
    )
    .await;
    let res = test::call_service(&app, req.to_request()).await;
    let status = res.status();
    let session = res
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.into_owned());
    let body = test::read_body_json(res).await;
    Reply {
        status,
        session,
        body,
    }
}

/// Registration payload for `username` on the `farm.com` domain.
pub fn registration(username: &str, password: &str) -> Value {
    json!({
        "username": username,
        "firstname": "Hen",
        "lastname": username,
        "email": format!("{username}@farm.com"),
        "password": password,
    })
}

/// Register `username` with [`PASSWORD`].
pub async fn register(state: &HttpState, username: &str) -> Reply {
    send(
        state,
        TestRequest::post()
            .uri("/api/register")
            .set_json(registration(username, PASSWORD)),
    )
    .await
}

/// Log `username` in and return the issued session cookie.
pub async fn login(state: &HttpState, username: &str) -> Cookie<'static> {
    let reply = send(
        state,
        TestRequest::post()
            .uri("/api/login")
            .set_json(json!({"email": format!("{username}@farm.com"), "password": PASSWORD})),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK, "login failed: {}", reply.body);
    reply.session.expect("login sets a session cookie")
}

/// Register and log in; returns the cookie and the user's id.
pub async fn sign_up(state: &HttpState, username: &str) -> (Cookie<'static>, String) {
    let registered = register(state, username).await;
    assert_eq!(registered.status, StatusCode::CREATED, "{}", registered.body);
    let cookie = login(state, username).await;
    let status = send(
        state,
        TestRequest::get().uri("/api/auth/status").cookie(cookie.clone()),
    )
    .await;
    let id = status.body["data"]["user"]["id"]
        .as_str()
        .expect("signed-in user id")
        .to_owned();
    (cookie, id)
}

/// Authenticated GET.
pub async fn get(state: &HttpState, uri: &str, cookie: &Cookie<'static>) -> Reply {
    send(state, TestRequest::get().uri(uri).cookie(cookie.clone())).await
}

/// Authenticated POST with a JSON body.
pub async fn post(state: &HttpState, uri: &str, cookie: &Cookie<'static>, body: Value) -> Reply {
    send(
        state,
        TestRequest::post()
            .uri(uri)
            .cookie(cookie.clone())
            .set_json(body),
    )
    .await
}
