//! Signup validation: cheap format predicates first, then uniqueness checks
//! against the store. Predicates compose left to right and short-circuit on
//! the first failure. A store error is NOT a rejection; it propagates so the
//! caller can answer with a transient failure instead of a 400.

use crate::store::{Store, StoreError};
use regex::Regex;

pub fn valid_username(username: &str) -> bool {
    username.len() >= 6
}

pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map_or(false, |re| re.is_match(email))
}

/// At least 8 characters, one digit, one lowercase, one uppercase, and
/// nothing outside the alphanumeric charset.
pub fn valid_password(password: &str) -> bool {
    password.len() >= 8
        && password.chars().all(|c| c.is_ascii_alphanumeric())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
}

/// Full signup decision: `Ok(false)` rejects the candidate, `Err` means the
/// store could not answer an existence check.
pub async fn validate(
    store: &Store,
    username: &str,
    email: &str,
    password: &str,
) -> Result<bool, StoreError> {
    if !valid_username(username) {
        return Ok(false);
    }

    if store.username_exists(username).await? {
        return Ok(false);
    }

    if !valid_email(email) {
        return Ok(false);
    }

    if store.email_exists(email).await? {
        return Ok(false);
    }

    Ok(valid_password(password))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_username() {
        assert!(valid_username("testuser"));
        assert!(valid_username("sixcha"));
        assert!(!valid_username("short"));
        assert!(!valid_username(""));
    }

    #[test]
    fn test_valid_email() {
        assert!(valid_email("testuser@bucketlist.com"));
        assert!(valid_email("a@x.io"));
        assert!(!valid_email("testuser"));
        assert!(!valid_email("testuser@"));
        assert!(!valid_email("@bucketlist.com"));
        assert!(!valid_email("testuser@bucketlist"));
        assert!(!valid_email("test user@bucketlist.com"));
        assert!(!valid_email(""));
    }

    #[test]
    fn test_valid_password() {
        assert!(valid_password("Testing123"));
        assert!(valid_password("Passw0rd"));

        // too short
        assert!(!valid_password("Test12"));
        // missing digit
        assert!(!valid_password("Testingabc"));
        // missing uppercase
        assert!(!valid_password("testing123"));
        // missing lowercase
        assert!(!valid_password("TESTING123"));
        // outside the alphanumeric charset
        assert!(!valid_password("Testing 123"));
        assert!(!valid_password("Testing123!"));
        assert!(!valid_password(""));
    }
}
