//! Cryptographic primitives: HMAC signing keys, token digests, password hashing.
//!
//! Everything here is security-sensitive. Signature comparison is constant
//! time and password hashing goes through Argon2id with per-hash salts.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;

use crate::error::AuthError;

/// Pre-validated HMAC-SHA256 signing key.
///
/// Validates key length once at construction so signing can never fail.
/// Cloning is cheap; the key material is shared behind an `Arc`.
#[derive(Clone)]
pub struct HmacKey {
    key_bytes: Arc<[u8]>,
}

impl HmacKey {
    /// Minimum key length in bytes (256 bits).
    pub const MIN_KEY_LENGTH: usize = 32;

    /// Create a signing key from raw bytes.
    ///
    /// # Errors
    /// Returns [`HmacKeyError::KeyTooShort`] for keys under 32 bytes.
    pub fn new(key: impl AsRef<[u8]>) -> Result<Self, HmacKeyError> {
        let key_bytes = key.as_ref();
        if key_bytes.len() < Self::MIN_KEY_LENGTH {
            return Err(HmacKeyError::KeyTooShort {
                actual: key_bytes.len(),
                minimum: Self::MIN_KEY_LENGTH,
            });
        }
        Ok(Self {
            key_bytes: Arc::from(key_bytes),
        })
    }

    /// Sign `data` and return the 32 MAC bytes.
    pub fn sign(&self, data: &[u8]) -> [u8; 32] {
        // Key length was validated in new(); HMAC accepts any length anyway.
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.key_bytes)
            .expect("key length validated at construction");
        mac.update(data);
        mac.finalize().into_bytes().into()
    }

    /// Verify a raw signature against `data` in constant time.
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> bool {
        constant_time_eq(&self.sign(data), signature)
    }
}

impl std::fmt::Debug for HmacKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacKey")
            .field("key_length", &self.key_bytes.len())
            .finish_non_exhaustive()
    }
}

/// Errors from HMAC key construction.
#[derive(Debug, Clone, thiserror::Error)]
pub enum HmacKeyError {
    #[error("HMAC key too short: got {actual} bytes, need at least {minimum}")]
    KeyTooShort { actual: usize, minimum: usize },
}

/// Constant-time byte comparison.
///
/// Length mismatch returns `false` immediately (length is not secret).
/// Otherwise every byte is examined regardless of where differences occur.
#[inline]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Hash a bearer token for at-rest storage.
///
/// SHA-256 hex digest; the original token cannot be recovered, so a leaked
/// tokens table cannot be replayed.
pub fn hash_token(token: &str) -> String {
    use sha2::Digest;
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Hash a password with Argon2id and a fresh random salt.
///
/// The returned string is in PHC format and embeds the salt and parameters.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| {
            tracing::error!("Password hashing failed: {}", err);
            AuthError::PasswordHash
        })
}

/// Verify a password against a stored PHC hash string.
///
/// A wrong password returns `Ok(false)`. An unparsable stored hash is
/// reported as an error rather than a failed match.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|err| {
        tracing::error!("Stored password hash is unparsable: {}", err);
        AuthError::PasswordHash
    })?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
