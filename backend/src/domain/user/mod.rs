//! User identity and profile model.
//!
//! A [`User`] is created once at registration and carries only non-secret
//! fields. The password hash lives beside it in [`UserCredentials`] and never
//! leaves the identity store.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum allowed length for usernames and names.
pub const NAME_MAX: usize = 64;

/// Validation errors for user fields.
///
/// The `Display` text is the message shown next to the offending form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Blank user id.
    EmptyId,
    /// User id is not a UUID.
    InvalidId,
    /// Blank username.
    EmptyUsername,
    /// Username over the length cap.
    UsernameTooLong {
        /// Maximum number of characters.
        max: usize,
    },
    /// Blank email address.
    EmptyEmail,
    /// Email address fails the format check.
    InvalidEmail,
    /// First or last name over the length cap.
    NameTooLong {
        /// Maximum number of characters.
        max: usize,
    },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "User ID is required"),
            Self::InvalidId => write!(f, "User ID must be a valid UUID"),
            Self::EmptyUsername => write!(f, "Username is required"),
            Self::UsernameTooLong { max } => {
                write!(f, "Username must be at most {max} characters")
            }
            Self::EmptyEmail => write!(f, "Email is required"),
            Self::InvalidEmail => write!(f, "Invalid email format"),
            Self::NameTooLong { max } => write!(f, "Name must be at most {max} characters"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    ///
    /// # Examples
    /// ```
    /// use eggcounter::domain::UserId;
    ///
    /// let id = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id");
    /// assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    /// ```
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.trim().is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random [`UserId`].
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID, typically one read back from storage.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unique login handle chosen at registration.
///
/// ## Invariants
/// - Trimmed, non-empty, and at most [`NAME_MAX`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`].
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if trimmed.chars().count() > NAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: NAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the username.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Applied after lower-casing, so the character classes are lower case only.
        let pattern = r"^[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Normalised email address: trimmed, lower-cased, `local@domain.tld` shaped.
///
/// # Examples
/// ```
/// use eggcounter::domain::EmailAddress;
///
/// let email = EmailAddress::new("  Hen@Farm.Example ").expect("valid email");
/// assert_eq!(email.as_str(), "hen@farm.example");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = Self::normalise(raw.as_ref());
        if normalised.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if !email_regex().is_match(&normalised) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }

    /// Apply the lookup normalisation without validating the shape.
    #[must_use]
    pub fn normalise(raw: &str) -> String {
        raw.trim().to_lowercase()
    }

    /// Borrow the address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// First or last name. May be empty; trimmed and length bounded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PersonName(String);

impl PersonName {
    /// Validate and construct a [`PersonName`].
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.chars().count() > NAME_MAX {
            return Err(UserValidationError::NameTooLong { max: NAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<PersonName> for String {
    fn from(value: PersonName) -> Self {
        value.0
    }
}

impl TryFrom<String> for PersonName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Registered user as exposed outside the identity store.
///
/// ## Invariants
/// - Contains no secret material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: UserId,
    username: Username,
    email: EmailAddress,
    first_name: PersonName,
    last_name: PersonName,
    created_at: DateTime<Utc>,
}

impl User {
    /// Assemble a user from validated parts.
    #[must_use]
    pub fn new(
        id: UserId,
        username: Username,
        email: EmailAddress,
        first_name: PersonName,
        last_name: PersonName,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            username,
            email,
            first_name,
            last_name,
            created_at,
        }
    }

    /// Stable identifier.
    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.id
    }

    /// Unique username.
    #[must_use]
    pub const fn username(&self) -> &Username {
        &self.username
    }

    /// Normalised email address.
    #[must_use]
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Given name.
    #[must_use]
    pub const fn first_name(&self) -> &PersonName {
        &self.first_name
    }

    /// Family name.
    #[must_use]
    pub const fn last_name(&self) -> &PersonName {
        &self.last_name
    }

    /// Registration timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Opaque password hash in PHC string format.
///
/// `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash produced by a password hasher or read from storage.
    #[must_use]
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Borrow the encoded hash.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// A user together with their stored credential. Only the identity store
/// sees this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCredentials {
    /// Public profile.
    pub user: User,
    /// Stored password digest.
    pub password_hash: PasswordHash,
}
