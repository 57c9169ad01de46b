//! Session cookie policy parsing and validation.
//!
//! Cookie attributes come from the environment so deployments behind TLS can
//! insist on `Secure`. Debug builds warn and fall back to safe defaults;
//! release builds refuse to start on missing or invalid values.

use actix_web::cookie::SameSite;
use mockable::Env;
use tracing::warn;

const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
const SAMESITE_ENV: &str = "SESSION_SAMESITE";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate defaults and emit warnings.
    Debug,
    /// Release builds require explicit, valid toggles.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use eggcounter::inbound::http::session_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// assert_eq!(mode == BuildMode::Debug, cfg!(debug_assertions));
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Attributes applied to the session cookie.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CookiePolicy {
    /// Whether the cookie is marked `Secure`.
    pub secure: bool,
    /// `SameSite` attribute.
    pub same_site: SameSite,
}

impl Default for CookiePolicy {
    fn default() -> Self {
        Self {
            secure: true,
            same_site: SameSite::Lax,
        }
    }
}

/// Errors raised while validating the cookie policy.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SessionConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {name}")]
    MissingEnv {
        /// Name of the missing variable.
        name: &'static str,
    },
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        /// Name of the offending variable.
        name: &'static str,
        /// Value that was supplied.
        value: String,
        /// Description of the accepted values.
        expected: &'static str,
    },
    /// `SameSite=None` requires a secure cookie in release builds.
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
}

/// Build the cookie policy from environment variables and build mode.
///
/// # Examples
///
/// ```rust
/// use eggcounter::inbound::http::session_config::{cookie_policy_from_env, BuildMode};
/// use mockable::MockEnv;
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|name| match name {
///     "SESSION_COOKIE_SECURE" => Some("1".to_owned()),
///     "SESSION_SAMESITE" => Some("Strict".to_owned()),
///     _ => None,
/// });
///
/// let policy = cookie_policy_from_env(&env, BuildMode::Release).expect("valid policy");
/// assert!(policy.secure);
/// ```
pub fn cookie_policy_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<CookiePolicy, SessionConfigError> {
    let secure = cookie_secure_from_env(env, mode)?;
    let same_site = same_site_from_env(env, mode, secure)?;
    Ok(CookiePolicy { secure, same_site })
}

fn cookie_secure_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<bool, SessionConfigError> {
    let Some(value) = env.string(COOKIE_SECURE_ENV) else {
        if mode.is_debug() {
            warn!("SESSION_COOKIE_SECURE not set; defaulting to secure");
            return Ok(true);
        }
        return Err(SessionConfigError::MissingEnv {
            name: COOKIE_SECURE_ENV,
        });
    };

    match parse_bool(&value) {
        Some(flag) => Ok(flag),
        None if mode.is_debug() => {
            warn!(value = %value, "invalid SESSION_COOKIE_SECURE; defaulting to secure");
            Ok(true)
        }
        None => Err(SessionConfigError::InvalidEnv {
            name: COOKIE_SECURE_ENV,
            value,
            expected: BOOL_EXPECTED,
        }),
    }
}

fn same_site_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, SessionConfigError> {
    let default_same_site = if mode.is_debug() {
        SameSite::Lax
    } else {
        SameSite::Strict
    };

    let Some(value) = env.string(SAMESITE_ENV) else {
        if mode.is_debug() {
            warn!("SESSION_SAMESITE not set; using default");
            return Ok(default_same_site);
        }
        return Err(SessionConfigError::MissingEnv { name: SAMESITE_ENV });
    };

    match value.to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" if cookie_secure => Ok(SameSite::None),
        "none" if mode.is_debug() => {
            warn!("SESSION_SAMESITE=None without a secure cookie; browsers may drop it");
            Ok(SameSite::None)
        }
        "none" => Err(SessionConfigError::InsecureSameSiteNone),
        _ if mode.is_debug() => {
            warn!(value = %value, "invalid SESSION_SAMESITE, using default");
            Ok(default_same_site)
        }
        _ => Err(SessionConfigError::InvalidEnv {
            name: SAMESITE_ENV,
            value,
            expected: SAMESITE_EXPECTED,
        }),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}
