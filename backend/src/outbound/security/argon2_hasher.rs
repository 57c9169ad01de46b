//! Argon2id implementation of the `PasswordHasher` port.
//!
//! Hashes are PHC strings carrying their own salt and parameters, so
//! verification does not depend on the hasher's configuration.

use argon2::password_hash::{
    PasswordHash as PhcHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use argon2::{Argon2, password_hash};
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use crate::domain::PasswordHash;
use crate::domain::ports::{PasswordHasher, PasswordHasherError};

/// Throwaway secret hashed once at startup to produce the decoy hash.
const DECOY_SECRET: &str = "decoy-credential-for-unknown-accounts";

/// Argon2id hasher with the crate's default parameters.
#[derive(Clone)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
    decoy: PasswordHash,
}

impl Argon2Hasher {
    /// Build a hasher and precompute its decoy hash.
    pub fn new() -> Result<Self, PasswordHasherError> {
        let argon2 = Argon2::default();
        let decoy = hash_with(&argon2, DECOY_SECRET)?;
        Ok(Self { argon2, decoy })
    }
}

fn hash_with(argon2: &Argon2<'_>, password: &str) -> Result<PasswordHash, PasswordHasherError> {
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|phc| PasswordHash::new(phc.to_string()))
        .map_err(|err| PasswordHasherError::hash(err.to_string()))
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHasherError> {
        let secret = Zeroizing::new(password.to_owned());
        hash_with(&self.argon2, &secret)
    }

    fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, PasswordHasherError> {
        let parsed = PhcHash::new(hash.as_str())
            .map_err(|err| PasswordHasherError::malformed_hash(err.to_string()))?;
        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => Err(PasswordHasherError::malformed_hash(err.to_string())),
        }
    }

    fn decoy_hash(&self) -> PasswordHash {
        self.decoy.clone()
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn hasher() -> Argon2Hasher {
        Argon2Hasher::new().expect("hasher builds")
    }

    #[rstest]
    fn hash_then_verify(hasher: Argon2Hasher) {
        let hash = hasher.hash("correct horse").expect("hash");
        assert!(hash.as_str().starts_with("$argon2id$"));
        assert!(hasher.verify("correct horse", &hash).expect("verify"));
        assert!(!hasher.verify("wrong horse", &hash).expect("verify"));
    }

    #[rstest]
    fn same_password_gets_distinct_salts(hasher: Argon2Hasher) {
        let first = hasher.hash("scrambled").expect("hash");
        let second = hasher.hash("scrambled").expect("hash");
        assert_ne!(first, second);
    }

    #[rstest]
    fn malformed_hash_is_reported(hasher: Argon2Hasher) {
        let err = hasher
            .verify("anything", &PasswordHash::new("not-a-phc-string"))
            .expect_err("malformed");
        assert!(matches!(err, PasswordHasherError::MalformedHash { .. }));
    }

    #[rstest]
    fn decoy_hash_rejects_ordinary_passwords(hasher: Argon2Hasher) {
        let decoy = hasher.decoy_hash();
        assert!(!hasher.verify("password123", &decoy).expect("verify"));
    }
}
