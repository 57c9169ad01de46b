//! Authentication primitives: registration input and login credentials.
//!
//! Inbound adapters hand raw strings to these constructors; everything past
//! this point works with validated values. Raw passwords are held in
//! [`Zeroizing`] buffers and never leave this module except by reference.

use std::fmt;

use zeroize::Zeroizing;

use super::error::FieldErrors;
use super::user::{EmailAddress, PersonName, UserValidationError, Username};

/// Minimum number of characters in a new password.
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Wire names of the registration form fields.
pub mod fields {
    /// Login name.
    pub const USERNAME: &str = "username";
    /// Given name.
    pub const FIRST_NAME: &str = "firstname";
    /// Family name.
    pub const LAST_NAME: &str = "lastname";
    /// Email address, also the login identifier.
    pub const EMAIL: &str = "email";
    /// Plaintext password.
    pub const PASSWORD: &str = "password";
}

/// Validated registration request.
///
/// ## Invariants
/// - Every field passed validation; all failures were reported together.
/// - `password` has at least [`PASSWORD_MIN_LENGTH`] characters.
///
/// # Examples
/// ```
/// use eggcounter::domain::Registration;
///
/// let errors = Registration::try_from_parts("", "", "", "bad", "short")
///     .expect_err("every field fails");
/// assert_eq!(errors.len(), 3);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Registration {
    username: Username,
    first_name: PersonName,
    last_name: PersonName,
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl Registration {
    /// Validate every field and collect all failures keyed by field name.
    pub fn try_from_parts(
        username: &str,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::default();

        let parsed_username = record(&mut errors, fields::USERNAME, Username::new(username));
        let parsed_first = record(&mut errors, fields::FIRST_NAME, PersonName::new(first_name));
        let parsed_last = record(&mut errors, fields::LAST_NAME, PersonName::new(last_name));
        let parsed_email = record(&mut errors, fields::EMAIL, EmailAddress::new(email));
        if let Err(message) = validate_new_password(password) {
            errors.insert(fields::PASSWORD, message);
        }

        match (parsed_username, parsed_first, parsed_last, parsed_email) {
            (Some(valid_username), Some(valid_first), Some(valid_last), Some(valid_email))
                if errors.is_empty() =>
            {
                Ok(Self {
                    username: valid_username,
                    first_name: valid_first,
                    last_name: valid_last,
                    email: valid_email,
                    password: Zeroizing::new(password.to_owned()),
                })
            }
            _ => Err(errors),
        }
    }

    /// Requested username.
    #[must_use]
    pub const fn username(&self) -> &Username {
        &self.username
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

    /// Normalised email address.
    #[must_use]
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Raw password; hash it, never store it.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn record<T>(
    errors: &mut FieldErrors,
    field: &str,
    result: Result<T, UserValidationError>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            errors.insert(field, err.to_string());
            None
        }
    }
}

fn validate_new_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_owned());
    }
    if password.chars().count() < PASSWORD_MIN_LENGTH {
        return Err(format!(
            "Password must be at least {PASSWORD_MIN_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Password was blank.
    EmptyPassword,
}

impl LoginValidationError {
    /// Wire name of the offending field.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyEmail => fields::EMAIL,
            Self::EmptyPassword => fields::PASSWORD,
        }
    }
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "Email is required"),
            Self::EmptyPassword => write!(f, "Password is required"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials used by the identity service.
///
/// ## Invariants
/// - `email` is trimmed and lower-cased, and not empty. Its shape is not
///   checked: a malformed address simply fails authentication.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use eggcounter::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" Hen@Farm.com ", "password").expect("valid");
/// assert_eq!(creds.email(), "hen@farm.com");
/// assert_eq!(creds.password(), "password");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalised = EmailAddress::normalise(email);
        if normalised.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }

        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            email: normalised,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email suitable for user lookups.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password string provided by the caller.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn register(password: &str) -> Result<Registration, FieldErrors> {
        Registration::try_from_parts("hen", "Henrietta", "Layer", "hen@farm.com", password)
    }

    #[rstest]
    fn collects_every_failure_at_once() {
        let errors = Registration::try_from_parts(" ", "A", "B", "nope", "")
            .expect_err("invalid registration");
        assert_eq!(errors.get("username"), Some("Username is required"));
        assert_eq!(errors.get("email"), Some("Invalid email format"));
        assert_eq!(errors.get("password"), Some("Password is required"));
        assert_eq!(errors.len(), 3);
    }

    #[rstest]
    fn debug_output_hides_passwords() {
        let registration = register("hunter2hunter2").expect("valid");
        let login = LoginCredentials::try_from_parts("hen@farm.com", "hunter2hunter2")
            .expect("valid");
        assert!(!format!("{registration:?}").contains("hunter2"));
        assert!(!format!("{login:?}").contains("hunter2"));
    }

    #[rstest]
    fn blank_email_reports_required() {
        let errors = Registration::try_from_parts("hen", "", "", "  ", "password1")
            .expect_err("blank email");
        assert_eq!(errors.get("email"), Some("Email is required"));
    }

    #[rstest]
    fn seven_character_password_is_rejected() {
        let errors = register("1234567").expect_err("too short");
        assert_eq!(
            errors.get("password"),
            Some("Password must be at least 8 characters")
        );
    }

    #[rstest]
    fn eight_character_password_is_accepted() {
        let registration = register("12345678").expect("boundary length passes");
        assert_eq!(registration.password(), "12345678");
        assert_eq!(registration.username().as_str(), "hen");
    }

    #[rstest]
    fn password_length_counts_characters_not_bytes() {
        assert!(register("ééééééé").is_err());
        assert!(register("éééééééé").is_ok());
    }

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyEmail)]
    #[case("   ", "pw", LoginValidationError::EmptyEmail)]
    #[case("hen@farm.com", "", LoginValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(email, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn login_keeps_password_whitespace() {
        let creds = LoginCredentials::try_from_parts("HEN@farm.com", " secret ")
            .expect("valid inputs should succeed");
        assert_eq!(creds.email(), "hen@farm.com");
        assert_eq!(creds.password(), " secret ");
    }
}
