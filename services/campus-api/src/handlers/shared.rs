//! Shared handler utilities
//!
//! Common validation, metrics, and session-resolution helpers used across
//! handlers. Centralizing these keeps rejection messages and metric labels
//! consistent.

use std::time::Instant;

use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

// ============================================================================
// Input Validation
// ============================================================================

/// Maximum length for human-entered name fields
pub const MAX_NAME_LEN: usize = 120;

/// Maximum length for email addresses (RFC 5321 forward-path bound)
pub const MAX_EMAIL_LEN: usize = 254;

/// Minimum password length accepted on create and update
pub const MIN_PASSWORD_LEN: usize = 8;

/// Trim and bounds-check a human-entered name field.
pub fn validate_name(value: &str, field: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(ApiError::Validation(format!("{field} must not be empty")));
    }

    if trimmed.len() > MAX_NAME_LEN {
        return Err(ApiError::Validation(format!(
            "{field} too long (max {MAX_NAME_LEN} chars)"
        )));
    }

    Ok(trimmed.to_string())
}

/// Minimal email shape check; uniqueness is enforced by the database.
pub fn validate_email(value: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();

    if trimmed.is_empty()
        || trimmed.len() > MAX_EMAIL_LEN
        || !trimmed.contains('@')
        || trimmed.starts_with('@')
        || trimmed.ends_with('@')
    {
        return Err(ApiError::Validation("invalid email address".into()));
    }

    Ok(trimmed.to_lowercase())
}

/// Reject passwords below the minimum length.
pub fn validate_password(value: &str) -> Result<(), ApiError> {
    if value.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Positive money amounts only; zero and negative are rejected.
pub fn validate_amount(amount_cents: i64) -> Result<(), ApiError> {
    if amount_cents <= 0 {
        return Err(ApiError::Validation(format!(
            "amount must be positive, got {amount_cents}"
        )));
    }
    Ok(())
}

/// Resolve an explicit session id, falling back to the active session.
///
/// Create endpoints accept an optional `session_id` so that day-to-day entry
/// lands in the current session without the client tracking it.
pub async fn resolve_session(state: &AppState, explicit: Option<Uuid>) -> Result<Uuid, ApiError> {
    match explicit {
        Some(id) => Ok(id),
        None => {
            let active = state.academics.active_session().await?;
            active.map(|s| s.id).ok_or_else(|| {
                ApiError::Validation("no active session; provide session_id".into())
            })
        }
    }
}

// ============================================================================
// Metrics Helpers
// ============================================================================

/// Record HTTP operation duration with result label.
///
/// Labels: operation, result (ok/err)
#[inline]
pub fn record_op_duration(operation: &'static str, start: Instant, success: bool) {
    let result = if success { "ok" } else { "err" };
    metrics::histogram!(
        "campus_operation_duration_seconds",
        "operation" => operation,
        "result" => result
    )
    .record(start.elapsed().as_secs_f64());
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("Grade 10", "name").unwrap(), "Grade 10");
        assert_eq!(validate_name("  Grade 10  ", "name").unwrap(), "Grade 10");

        assert!(validate_name("", "name").is_err());
        assert!(validate_name("   ", "name").is_err());
        assert!(validate_name(&"a".repeat(MAX_NAME_LEN + 1), "name").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email("Admin@School.edu").unwrap(), "admin@school.edu");
        assert_eq!(validate_email("  x@y.z  ").unwrap(), "x@y.z");

        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@leading").is_err());
        assert!(validate_email("trailing@").is_err());
        assert!(validate_email(&format!("{}@x.y", "a".repeat(MAX_EMAIL_LEN))).is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("longenough").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password("").is_err());
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(1).is_ok());
        assert!(validate_amount(50_000).is_ok());
        assert!(validate_amount(0).is_err());
        assert!(validate_amount(-500).is_err());
    }
}
