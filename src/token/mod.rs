//! Session token issuance and verification.
//!
//! Tokens are HS256 JWTs signed with a single process-wide secret loaded at
//! startup. Claims carry the account id and username, an explicit one-hour
//! expiry, and a unique token id. Verification is stateless; there is no
//! server-side session table and no revocation.

use anyhow::{anyhow, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use ulid::Ulid;
use uuid::Uuid;

/// Lifetime of an issued token in seconds.
pub const TOKEN_TTL_SECS: i64 = 3600;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id (UUID string).
    pub sub: String,
    pub username: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Unique token id.
    pub jti: String,
}

/// Issue a signed token for an authenticated account.
///
/// # Errors
/// Returns an error if signing fails.
pub fn issue(account_id: Uuid, username: &str, secret: &SecretString) -> Result<String> {
    let now = Utc::now().timestamp();

    let claims = Claims {
        sub: account_id.to_string(),
        username: username.to_string(),
        iat: now,
        exp: now + TOKEN_TTL_SECS,
        jti: Ulid::new().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
    )
    .map_err(|e| anyhow!("Error signing token: {e}"))
}

/// Verify a bearer token's signature and expiry, returning its claims.
///
/// # Errors
/// Returns an error if the token is tampered with, expired, or malformed.
pub fn verify(token: &str, secret: &SecretString) -> Result<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| anyhow!("Token rejected: {e}"))
}
