//! Port for one-way password hashing.
//!
//! Implementations are deliberately slow, so callers run them on the
//! blocking thread pool.

use crate::domain::PasswordHash;

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashers.
    pub enum PasswordHasherError {
        /// Hashing failed.
        Hash { message: String } => "password hashing failed: {message}",
        /// A stored hash could not be parsed.
        MalformedHash { message: String } => "stored password hash is malformed: {message}",
    }
}

/// Salted, slow, one-way password hashing.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Hash `password` with a fresh salt.
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHasherError>;

    /// Check `password` against a stored hash.
    fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, PasswordHasherError>;

    /// A well-formed hash no password matches. Verified against when an email
    /// is unknown so both failure paths cost the same.
    fn decoy_hash(&self) -> PasswordHash;
}
