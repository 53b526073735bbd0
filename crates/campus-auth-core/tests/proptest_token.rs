//! Property-based tests for bearer token signing and parsing.
//!
//! Covered properties:
//! - Signed tokens always roundtrip through verification
//! - Malformed tokens never panic the verifier
//! - Any tampering with signature or payload is detected
//! - HMAC key length validation holds for all lengths

mod common;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use campus_auth_core::{sign_token, verify_token, AuthError, HmacKey, TokenPayload};
use proptest::prelude::*;
use std::time::Duration;

// ============================================================================
// Strategies
// ============================================================================

const ROLES: &[&str] = &["superadmin", "admin", "teacher", "accountant", "student"];

/// Generate arbitrary token payloads
fn arb_token_payload() -> impl Strategy<Value = TokenPayload> {
    (
        any::<[u8; 16]>(),
        "[a-z0-9_.+-]+@[a-z0-9.-]+\\.[a-z]{2,4}",
        0..ROLES.len(),
        60u64..604_800u64, // 1 minute to 1 week
    )
        .prop_map(|(id_bytes, email, role_idx, ttl_secs)| {
            TokenPayload::new(
                uuid::Uuid::from_bytes(id_bytes),
                &email,
                ROLES[role_idx],
                Duration::from_secs(ttl_secs),
            )
        })
}

/// Generate malformed token strings
fn arb_malformed_token() -> impl Strategy<Value = String> {
    prop_oneof![
        // No separator
        "[a-zA-Z0-9_-]{10,50}",
        // Empty parts
        Just(".signature".to_string()),
        Just("payload.".to_string()),
        Just("..".to_string()),
        Just(".".to_string()),
        Just("".to_string()),
        // Invalid base64 characters
        "[!@#$%^&*()]{10,30}\\.[a-zA-Z0-9_-]{20,40}",
        // Valid base64 but not JSON
        any::<[u8; 32]>().prop_map(|bytes| format!("{}.fake_sig", URL_SAFE_NO_PAD.encode(bytes))),
        // Truncated signature
        any::<[u8; 16]>().prop_map(|bytes| format!("{}.abc", URL_SAFE_NO_PAD.encode(bytes))),
    ]
}

/// Generate printable secrets of a given byte range
fn arb_secret(range: std::ops::Range<usize>) -> impl Strategy<Value = String> {
    prop::collection::vec(any::<u8>(), range)
        .prop_map(|bytes| bytes.iter().map(|b| (b % 94 + 33) as char).collect())
}

fn test_key() -> HmacKey {
    HmacKey::new("proptest-signing-secret-0123456789abcdef").unwrap()
}

// ============================================================================
// Key Validation Properties
// ============================================================================

proptest! {
    /// Property: keys of 32+ bytes are accepted
    #[test]
    fn prop_long_keys_accepted(secret in arb_secret(32..64)) {
        prop_assert!(HmacKey::new(&secret).is_ok());
    }

    /// Property: keys under 32 bytes are rejected
    #[test]
    fn prop_short_keys_rejected(secret in arb_secret(1..32)) {
        prop_assert!(HmacKey::new(&secret).is_err());
    }
}

// ============================================================================
// Signing Properties
// ============================================================================

proptest! {
    /// Property: signed tokens always verify and preserve their claims
    #[test]
    fn prop_signed_token_roundtrips(payload in arb_token_payload()) {
        let key = test_key();
        let token = sign_token(&key, &payload).unwrap();

        let verified = verify_token(&key, &token).unwrap();
        prop_assert_eq!(verified.user_id, payload.user_id);
        prop_assert_eq!(verified.email, payload.email);
        prop_assert_eq!(verified.role, payload.role);
        prop_assert_eq!(verified.expires, payload.expires);
    }

    /// Property: verification never panics on arbitrary input
    #[test]
    fn prop_malformed_token_never_panics(token in arb_malformed_token()) {
        let key = test_key();
        let result = std::panic::catch_unwind(|| {
            let _ = verify_token(&key, &token);
        });
        prop_assert!(result.is_ok(), "verification panicked for {:?}", token);
    }

    /// Property: malformed tokens are rejected, not accepted
    #[test]
    fn prop_malformed_token_rejected(token in arb_malformed_token()) {
        let key = test_key();
        prop_assert!(verify_token(&key, &token).is_err());
    }

    /// Property: changing any signature character invalidates the token
    #[test]
    fn prop_signature_tampering_detected(
        payload in arb_token_payload(),
        pos_seed in any::<usize>(),
    ) {
        let key = test_key();
        let token = sign_token(&key, &payload).unwrap();

        let dot = token.rfind('.').unwrap();
        let sig_len = token.len() - dot - 1;
        let pos = dot + 1 + (pos_seed % sig_len);

        let mut bytes = token.clone().into_bytes();
        let original = bytes[pos];
        bytes[pos] = if original == b'A' { b'B' } else { b'A' };

        if bytes[pos] != original {
            let tampered = String::from_utf8(bytes).unwrap();
            prop_assert!(matches!(
                verify_token(&key, &tampered),
                Err(AuthError::InvalidToken)
            ));
        }
    }

    /// Property: re-signing a modified payload changes the signature
    #[test]
    fn prop_payload_tampering_detected(
        payload in arb_token_payload(),
        tamper_byte in 0usize..100usize,
    ) {
        let key = test_key();
        let payload_json = serde_json::to_vec(&payload).unwrap();
        let original_b64 = URL_SAFE_NO_PAD.encode(&payload_json);
        let original_sig = key.sign(original_b64.as_bytes());

        let mut tampered_json = payload_json.clone();
        if tamper_byte < tampered_json.len() {
            tampered_json[tamper_byte] = tampered_json[tamper_byte].wrapping_add(1);
        }

        if tampered_json != payload_json {
            let tampered_b64 = URL_SAFE_NO_PAD.encode(&tampered_json);
            let tampered_sig = key.sign(tampered_b64.as_bytes());
            prop_assert_ne!(original_sig, tampered_sig);

            // The original signature no longer validates the altered payload
            let forged = format!("{}.{}", tampered_b64, URL_SAFE_NO_PAD.encode(original_sig));
            prop_assert!(verify_token(&key, &forged).is_err());
        }
    }

    /// Property: tokens signed under one secret never verify under another
    #[test]
    fn prop_cross_key_rejected(
        payload in arb_token_payload(),
        secret_a in arb_secret(32..48),
        secret_b in arb_secret(32..48),
    ) {
        prop_assume!(secret_a != secret_b);
        let key_a = HmacKey::new(&secret_a).unwrap();
        let key_b = HmacKey::new(&secret_b).unwrap();

        let token = sign_token(&key_a, &payload).unwrap();
        prop_assert!(matches!(
            verify_token(&key_b, &token),
            Err(AuthError::InvalidToken)
        ));
    }
}

// ============================================================================
// Non-Property Edge Cases
// ============================================================================

#[test]
fn test_expired_payload_rejected_even_when_signed() {
    let key = test_key();
    let mut payload = TokenPayload::new(
        uuid::Uuid::new_v4(),
        "old@school.test",
        "teacher",
        Duration::from_secs(60),
    );
    payload.expires = chrono::Utc::now().timestamp_millis() - 10_000;

    let token = sign_token(&key, &payload).unwrap();
    assert!(matches!(
        verify_token(&key, &token),
        Err(AuthError::TokenExpired)
    ));
}

#[test]
fn test_key_boundary_lengths() {
    assert!(HmacKey::new("a".repeat(31)).is_err());
    assert!(HmacKey::new("a".repeat(32)).is_ok());
    assert!(HmacKey::new("a".repeat(33)).is_ok());
}

#[test]
fn test_empty_token_rejected() {
    assert!(verify_token(&test_key(), "").is_err());
}
