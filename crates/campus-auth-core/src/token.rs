//! Signed bearer tokens
//!
//! Wire format is `base64url(payload json)` + `.` + `base64url(hmac-sha256)`.
//! The payload is readable by anyone holding the token; the signature stops
//! anyone without the server secret from minting or altering one.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::crypto::{constant_time_eq, HmacKey};
use crate::error::AuthError;

/// Claims carried inside a signed bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPayload {
    /// User ID
    pub user_id: Uuid,
    /// User email
    pub email: String,
    /// Role name as stored in the users table
    pub role: String,
    /// Issue timestamp (milliseconds since epoch)
    pub issued: i64,
    /// Expiration timestamp (milliseconds since epoch)
    pub expires: i64,
}

impl TokenPayload {
    /// Create a payload expiring `ttl` from now.
    pub fn new(
        user_id: Uuid,
        email: impl Into<String>,
        role: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now().timestamp_millis();
        Self {
            user_id,
            email: email.into(),
            role: role.into(),
            issued: now,
            expires: now + ttl.as_millis() as i64,
        }
    }

    /// Check whether the payload's expiry has passed.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp_millis() > self.expires
    }
}

/// Sign a payload and return the full token string.
pub fn sign_token(key: &HmacKey, payload: &TokenPayload) -> Result<String, AuthError> {
    let payload_json = serde_json::to_vec(payload).map_err(|err| {
        tracing::error!("Failed to serialize token payload: {}", err);
        AuthError::Internal("failed to issue token".to_string())
    })?;
    let payload_b64 = URL_SAFE_NO_PAD.encode(&payload_json);
    let signature = compute_signature(key, &payload_b64);
    Ok(format!("{payload_b64}.{signature}"))
}

/// Verify a token's signature and expiry and return its payload.
///
/// Purely cryptographic: revocation is checked against the database by the
/// service layer, not here.
pub fn verify_token(key: &HmacKey, token: &str) -> Result<TokenPayload, AuthError> {
    let parts: Vec<&str> = token.rsplitn(2, '.').collect();
    if parts.len() != 2 {
        return Err(AuthError::InvalidToken);
    }
    let (signature, payload_b64) = (parts[0], parts[1]);

    // Constant-time signature check before touching the payload.
    let expected = compute_signature(key, payload_b64);
    if !constant_time_eq(signature.as_bytes(), expected.as_bytes()) {
        tracing::debug!("Token signature mismatch");
        return Err(AuthError::InvalidToken);
    }

    let payload_json = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| AuthError::InvalidToken)?;
    let payload: TokenPayload =
        serde_json::from_slice(&payload_json).map_err(|_| AuthError::InvalidToken)?;

    if payload.is_expired() {
        return Err(AuthError::TokenExpired);
    }

    Ok(payload)
}

fn compute_signature(key: &HmacKey, data: &str) -> String {
    URL_SAFE_NO_PAD.encode(key.sign(data.as_bytes()))
}
