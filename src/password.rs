//! Argon2id password hashing and verification. Only the salted PHC-format
//! hash is stored; raw passwords are never persisted or compared.

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, SaltString},
    Argon2, PasswordHasher, PasswordVerifier,
};
use std::sync::OnceLock;

/// Hash a password with a fresh random salt.
///
/// # Errors
/// Returns an error if hashing fails.
pub fn hash(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| anyhow!("Error hashing password: {e}"))
}

/// Verify a password against a stored PHC-format hash.
///
/// # Errors
/// Returns an error if the stored hash is malformed.
pub fn verify(password: &str, stored: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored).map_err(|e| anyhow!("Invalid stored hash: {e}"))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow!("Error verifying password: {e}")),
    }
}

/// Hash verified against when a username lookup misses, so an unknown
/// username costs the same as a wrong password.
pub fn dummy_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();

    DUMMY.get_or_init(|| hash("correct horse battery staple").unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_matches() {
        let stored = hash("Testing123").unwrap();
        assert!(verify("Testing123", &stored).unwrap());
    }

    #[test]
    fn wrong_password_does_not_match() {
        let stored = hash("Testing123").unwrap();
        assert!(!verify("Testing124", &stored).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        assert_ne!(hash("Testing123").unwrap(), hash("Testing123").unwrap());
    }

    #[test]
    fn malformed_stored_hash_is_an_error() {
        assert!(verify("Testing123", "not-a-phc-hash").is_err());
    }

    #[test]
    fn dummy_hash_is_verifiable() {
        assert!(!verify("anything", dummy_hash()).unwrap());
    }
}
