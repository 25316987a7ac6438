//! TOTP secret provisioning and code verification.
//!
//! Enrollment generates a 160-bit random secret and returns its base32
//! encoding (the backup code shown exactly once to the user), the
//! `otpauth://` provisioning URI, and a QR encoding of that URI as a PNG
//! data URL. Verification accepts a skew window either side of the current
//! 30-second step to tolerate client clock drift.

use anyhow::{anyhow, Result};
use totp_rs::{Algorithm, Secret, TOTP};

pub const DIGITS: usize = 6;
pub const STEP_SECONDS: u64 = 30;
/// Steps accepted either side of the current one (150 seconds of skew).
pub const SKEW_STEPS: u8 = 5;

/// Ephemeral enrollment artifacts. Only the secret is persisted; the backup
/// code is the secret re-encoded and is not retrievable again.
#[derive(Debug)]
pub struct Enrollment {
    pub backup_code: String,
    pub otpauth_url: String,
    pub qr_data_url: String,
}

fn totp(secret_bytes: Vec<u8>, issuer: &str, account: &str) -> Result<TOTP> {
    TOTP::new(
        Algorithm::SHA1,
        DIGITS,
        SKEW_STEPS,
        STEP_SECONDS,
        secret_bytes,
        Some(issuer.to_string()),
        account.to_string(),
    )
    .map_err(|e| anyhow!("TOTP init error: {e}"))
}

/// Generate a fresh secret and its provisioning artifacts for `account`.
///
/// # Errors
/// Returns an error if secret or QR generation fails.
pub fn enroll(issuer: &str, account: &str) -> Result<Enrollment> {
    let secret = Secret::generate_secret();
    let secret_bytes = secret
        .to_bytes()
        .map_err(|e| anyhow!("Secret gen error: {e}"))?;

    let totp = totp(secret_bytes, issuer, account)?;

    let qr = totp
        .get_qr_base64()
        .map_err(|e| anyhow!("QR gen error: {e}"))?;

    Ok(Enrollment {
        backup_code: totp.get_secret_base32(),
        otpauth_url: totp.get_url(),
        qr_data_url: format!("data:image/png;base64,{qr}"),
    })
}

/// Verify `code` against a stored base32 secret at the current time step.
///
/// # Errors
/// Returns an error if the stored secret cannot be decoded.
pub fn verify(secret_base32: &str, code: &str, issuer: &str, account: &str) -> Result<bool> {
    let secret_bytes = Secret::Encoded(secret_base32.to_string())
        .to_bytes()
        .map_err(|e| anyhow!("Stored secret decode error: {e}"))?;

    let totp = totp(secret_bytes, issuer, account)?;

    Ok(totp.check_current(code).unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    const ISSUER: &str = "Bucketlist";
    const ACCOUNT: &str = "testuser";

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    #[test]
    fn enrollment_produces_all_artifacts() {
        let enrollment = enroll(ISSUER, ACCOUNT).unwrap();

        assert!(!enrollment.backup_code.is_empty());
        assert!(enrollment.otpauth_url.starts_with("otpauth://totp/"));
        assert!(enrollment.otpauth_url.contains("secret="));
        assert!(enrollment.otpauth_url.contains("issuer=Bucketlist"));
        assert!(enrollment.qr_data_url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn enrollment_secrets_are_unique() {
        let a = enroll(ISSUER, ACCOUNT).unwrap();
        let b = enroll(ISSUER, ACCOUNT).unwrap();
        assert_ne!(a.backup_code, b.backup_code);
    }

    #[test]
    fn backup_code_round_trip() {
        // The backup code re-encodes the secret, so a code derived from it
        // must verify against the stored secret.
        let enrollment = enroll(ISSUER, ACCOUNT).unwrap();

        let secret_bytes = Secret::Encoded(enrollment.backup_code.clone())
            .to_bytes()
            .unwrap();
        let reference = totp(secret_bytes, ISSUER, ACCOUNT).unwrap();
        let code = reference.generate_current().unwrap();

        assert!(verify(&enrollment.backup_code, &code, ISSUER, ACCOUNT).unwrap());
    }

    #[test]
    fn code_within_skew_window_is_accepted() {
        let enrollment = enroll(ISSUER, ACCOUNT).unwrap();
        let secret_bytes = Secret::Encoded(enrollment.backup_code.clone())
            .to_bytes()
            .unwrap();
        let reference = totp(secret_bytes, ISSUER, ACCOUNT).unwrap();

        // 4 steps in the past, safely inside the 5-step window even if the
        // current step rolls over while the test runs.
        let stale = reference.generate(now() - 4 * STEP_SECONDS);

        assert!(verify(&enrollment.backup_code, &stale, ISSUER, ACCOUNT).unwrap());
    }

    #[test]
    fn code_outside_skew_window_is_rejected() {
        let enrollment = enroll(ISSUER, ACCOUNT).unwrap();
        let secret_bytes = Secret::Encoded(enrollment.backup_code.clone())
            .to_bytes()
            .unwrap();
        let reference = totp(secret_bytes, ISSUER, ACCOUNT).unwrap();

        // 8 steps in the past, outside the window with margin for rollover.
        let expired = reference.generate(now() - 8 * STEP_SECONDS);

        assert!(!verify(&enrollment.backup_code, &expired, ISSUER, ACCOUNT).unwrap());
    }

    #[test]
    fn wrong_code_is_rejected() {
        let enrollment = enroll(ISSUER, ACCOUNT).unwrap();
        let secret_bytes = Secret::Encoded(enrollment.backup_code.clone())
            .to_bytes()
            .unwrap();
        let reference = totp(secret_bytes, ISSUER, ACCOUNT).unwrap();

        // Corrupt the last digit so the code cannot match the current step.
        let mut code = reference.generate_current().unwrap().into_bytes();
        let last = code.last_mut().unwrap();
        *last = b'0' + ((*last - b'0' + 1) % 10);
        let wrong = String::from_utf8(code).unwrap();

        assert!(!verify(&enrollment.backup_code, &wrong, ISSUER, ACCOUNT).unwrap());
    }

    #[test]
    fn undecodable_stored_secret_is_an_error() {
        assert!(verify("not-base32!", "000000", ISSUER, ACCOUNT).is_err());
    }
}
