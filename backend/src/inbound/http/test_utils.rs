//! Test helpers for inbound HTTP components.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use actix_web::cookie::{Cookie, SameSite};
use actix_web::dev::ServiceResponse;
use actix_web::{App, test, web};
use chrono::Utc;
use mockall::predicate::eq;
use serde_json::Value;
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

use super::session::{SESSION_COOKIE, SessionCookieConfig};
use super::session_config::CookiePolicy;
use super::state::{HttpState, HttpStatePorts};
use crate::domain::ports::{MockEggLedger, MockFriendGraph, MockIdentityStore, MockSessionResolver};
use crate::domain::{EmailAddress, PersonName, SessionHandle, User, UserId, Username};

/// One mock per driving port.
#[derive(Default)]
pub struct MockPorts {
    /// Identity port.
    pub identity: MockIdentityStore,
    /// Session resolver port.
    pub sessions: MockSessionResolver,
    /// Ledger port.
    pub eggs: MockEggLedger,
    /// Friend graph port.
    pub friends: MockFriendGraph,
}

impl MockPorts {
    /// Expect `handle` to resolve to `user_id` any number of times.
    pub fn sign_in(&mut self, user_id: &UserId) -> SessionHandle {
        let handle = SessionHandle::generate();
        let resolved = user_id.clone();
        self.sessions
            .expect_resolve()
            .with(eq(handle.clone()))
            .returning(move |_| Ok(resolved.clone()));
        handle
    }

    /// Wire the mocks into handler state.
    #[must_use]
    pub fn into_state(self) -> HttpState {
        HttpState::new(
            HttpStatePorts {
                identity: Arc::new(self.identity),
                sessions: Arc::new(self.sessions),
                eggs: Arc::new(self.eggs),
                friends: Arc::new(self.friends),
            },
            cookie_config(),
        )
    }
}

/// Cookie settings suitable for plain-HTTP tests.
#[must_use]
pub fn cookie_config() -> SessionCookieConfig {
    SessionCookieConfig {
        policy: CookiePolicy {
            secure: false,
            same_site: SameSite::Lax,
        },
        max_age: Duration::from_secs(3_600),
    }
}

/// Session cookie carrying `handle`.
#[must_use]
pub fn session_cookie(handle: &SessionHandle) -> Cookie<'static> {
    Cookie::new(SESSION_COOKIE, handle.expose().to_owned())
}

/// Valid user with a random id.
#[must_use]
pub fn sample_user(username: &str) -> User {
    User::new(
        UserId::random(),
        Username::new(username).expect("valid username"),
        EmailAddress::new(format!("{username}@farm.com")).expect("valid email"),
        PersonName::new("Hen").expect("valid name"),
        PersonName::new("Layer").expect("valid name"),
        Utc::now(),
    )
}

/// Send `req` through the full API scope backed by `ports`.
pub async fn call(ports: MockPorts, req: test::TestRequest) -> ServiceResponse {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(ports.into_state()))
            .service(super::api_scope()),
    )
    .await;
    test::call_service(&app, req.to_request()).await
}

/// Counts `INFO` events raised by the HTTP adapter on the current thread.
///
/// Success events belong to the domain services, which are mocked here, so a
/// handler test that sees any of these has found a duplicate log line.
#[derive(Clone, Default)]
pub struct AdapterInfoEvents(Arc<AtomicUsize>);

impl AdapterInfoEvents {
    const TARGET: &'static str = "eggcounter::inbound";

    /// Start counting; events are recorded until the guard drops.
    #[must_use]
    pub fn capture() -> (Self, DefaultGuard) {
        let events = Self::default();
        let guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(events.clone()));
        (events, guard)
    }

    /// Events seen so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl<S: Subscriber> Layer<S> for AdapterInfoEvents {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if *meta.level() == Level::INFO && meta.target().starts_with(Self::TARGET) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Deserialize the response body as JSON.
pub async fn body_json(res: ServiceResponse) -> Value {
    test::read_body_json(res).await
}
