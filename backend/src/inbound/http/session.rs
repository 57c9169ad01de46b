//! Session cookie handling for HTTP handlers.
//!
//! The browser holds only an opaque handle in an `HttpOnly` cookie. The
//! [`Authenticated`] extractor resolves it through the session resolver
//! before any handler runs; a request without a cookie is rejected without
//! touching storage.

use std::time::Duration;

use actix_web::cookie::{Cookie, time};
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::debug;

use super::session_config::CookiePolicy;
use super::state::HttpState;
use crate::domain::{Error, SessionHandle, UNAUTHENTICATED, UserId};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session";

/// Cookie attributes plus the lifetime advertised to the browser.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionCookieConfig {
    /// `Secure` and `SameSite` attributes.
    pub policy: CookiePolicy,
    /// `Max-Age` sent with a fresh session.
    pub max_age: Duration,
}

impl SessionCookieConfig {
    /// Cookie carrying a freshly established handle.
    #[must_use]
    pub fn issue(&self, handle: &SessionHandle) -> Cookie<'static> {
        let max_age = i64::try_from(self.max_age.as_secs()).unwrap_or(i64::MAX);
        self.base(handle.expose().to_owned())
            .max_age(time::Duration::seconds(max_age))
            .finish()
    }

    /// Cookie instructing the browser to drop the session.
    #[must_use]
    pub fn clear(&self) -> Cookie<'static> {
        self.base(String::new())
            .max_age(time::Duration::ZERO)
            .finish()
    }

    fn base(&self, value: String) -> actix_web::cookie::CookieBuilder<'static> {
        Cookie::build(SESSION_COOKIE, value)
            .path("/")
            .http_only(true)
            .secure(self.policy.secure)
            .same_site(self.policy.same_site)
    }
}

/// Handle presented by the client, if it is well formed.
///
/// Never fails: a missing or malformed cookie is simply absent.
#[derive(Debug, Clone)]
pub struct PresentedSession(pub Option<SessionHandle>);

fn presented_handle(req: &HttpRequest) -> Option<SessionHandle> {
    let cookie = req.cookie(SESSION_COOKIE)?;
    let handle = SessionHandle::parse(cookie.value());
    if handle.is_none() {
        debug!("ignoring malformed session cookie");
    }
    handle
}

impl FromRequest for PresentedSession {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(Self(presented_handle(req))))
    }
}

/// Identity of the caller, resolved from the session cookie.
#[derive(Debug, Clone)]
pub struct Authenticated {
    /// Signed-in user.
    pub user_id: UserId,
    /// Session the request presented.
    pub handle: SessionHandle,
}

fn http_state(req: &HttpRequest) -> Result<web::Data<HttpState>, Error> {
    req.app_data::<web::Data<HttpState>>()
        .cloned()
        .ok_or_else(|| Error::internal("HTTP state is not registered"))
}

impl FromRequest for Authenticated {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let handle = presented_handle(req);
        let state = http_state(req);
        Box::pin(async move {
            let Some(handle) = handle else {
                return Err(Error::unauthorized(UNAUTHENTICATED));
            };
            let user_id = state?.sessions.resolve(&handle).await?;
            Ok(Self { user_id, handle })
        })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::cookie::SameSite;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn config() -> SessionCookieConfig {
        SessionCookieConfig {
            policy: CookiePolicy {
                secure: true,
                same_site: SameSite::Strict,
            },
            max_age: Duration::from_secs(86_400),
        }
    }

    #[rstest]
    fn issued_cookie_is_http_only_and_scoped_to_root(config: SessionCookieConfig) {
        let handle = SessionHandle::generate();
        let cookie = config.issue(&handle);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), handle.expose());
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(86_400)));
    }

    #[rstest]
    fn clearing_cookie_expires_immediately(config: SessionCookieConfig) {
        let cookie = config.clear();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }

    #[rstest]
    fn malformed_cookie_is_ignored() {
        let req = actix_web::test::TestRequest::default()
            .cookie(Cookie::new(SESSION_COOKIE, "not-a-handle"))
            .to_http_request();
        assert!(presented_handle(&req).is_none());
    }
}
