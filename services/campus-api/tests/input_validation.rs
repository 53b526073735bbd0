//! Input validation tests
//!
//! Boundary tests for the request validation rules in campus-api, plus the
//! enumeration and id parsing the handlers rely on.

use campus_types::{FeeFrequency, PaymentMode, Role, SessionStatus};
use uuid::Uuid;

/// Maximum length for name fields (must match handler constant)
const MAX_NAME_LEN: usize = 120;

/// Maximum length for email addresses (must match handler constant)
const MAX_EMAIL_LEN: usize = 254;

/// Minimum password length (must match handler constant)
const MIN_PASSWORD_LEN: usize = 8;

/// Validate a name field (mirrors the handler logic for testing)
fn validate_name(value: &str) -> Result<String, &'static str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("name must not be empty");
    }
    if trimmed.len() > MAX_NAME_LEN {
        return Err("name too long");
    }
    Ok(trimmed.to_string())
}

/// Validate an email address (mirrors the handler logic for testing)
fn validate_email(value: &str) -> Result<String, &'static str> {
    let trimmed = value.trim();
    if trimmed.is_empty()
        || trimmed.len() > MAX_EMAIL_LEN
        || !trimmed.contains('@')
        || trimmed.starts_with('@')
        || trimmed.ends_with('@')
    {
        return Err("invalid email address");
    }
    Ok(trimmed.to_lowercase())
}

// ============================================================================
// Name Fields
// ============================================================================

#[test]
fn test_valid_name() {
    assert_eq!(validate_name("Grade 10").unwrap(), "Grade 10");
}

#[test]
fn test_name_is_trimmed() {
    assert_eq!(validate_name("  Section A  ").unwrap(), "Section A");
}

#[test]
fn test_name_max_length_accepted() {
    let name = "a".repeat(MAX_NAME_LEN);
    assert!(validate_name(&name).is_ok());
}

#[test]
fn test_empty_name_rejected() {
    assert!(validate_name("").is_err());
}

#[test]
fn test_whitespace_only_name_rejected() {
    assert!(validate_name("   \t  ").is_err());
}

#[test]
fn test_overlong_name_rejected() {
    let name = "a".repeat(MAX_NAME_LEN + 1);
    assert!(validate_name(&name).is_err());
}

// ============================================================================
// Email Addresses
// ============================================================================

#[test]
fn test_valid_email_lowercased() {
    assert_eq!(validate_email("Admin@School.EDU").unwrap(), "admin@school.edu");
}

#[test]
fn test_email_without_at_rejected() {
    assert!(validate_email("admin.school.edu").is_err());
}

#[test]
fn test_email_leading_at_rejected() {
    assert!(validate_email("@school.edu").is_err());
}

#[test]
fn test_email_trailing_at_rejected() {
    assert!(validate_email("admin@").is_err());
}

#[test]
fn test_empty_email_rejected() {
    assert!(validate_email("").is_err());
}

#[test]
fn test_overlong_email_rejected() {
    let email = format!("{}@x.y", "a".repeat(MAX_EMAIL_LEN));
    assert!(validate_email(&email).is_err());
}

// ============================================================================
// Passwords and Amounts
// ============================================================================

#[test]
fn test_password_minimum_length() {
    assert!("exactly8".len() >= MIN_PASSWORD_LEN);
    assert!("short".len() < MIN_PASSWORD_LEN);
}

#[test]
fn test_amount_positivity_boundaries() {
    // Handlers reject zero and negative amounts before any database work
    let is_valid = |cents: i64| cents > 0;

    assert!(is_valid(1));
    assert!(is_valid(50_000));
    assert!(is_valid(i64::MAX));
    assert!(!is_valid(0));
    assert!(!is_valid(-1));
    assert!(!is_valid(i64::MIN));
}

// ============================================================================
// Enumeration Parsing
// ============================================================================

#[test]
fn test_all_roles_parse() {
    for role in ["superadmin", "admin", "teacher", "accountant", "student"] {
        assert!(role.parse::<Role>().is_ok(), "role {role} should parse");
    }
}

#[test]
fn test_unknown_role_rejected() {
    assert!("principal".parse::<Role>().is_err());
    assert!("".parse::<Role>().is_err());
    assert!("Admin".parse::<Role>().is_err(), "roles are case-sensitive");
}

#[test]
fn test_all_payment_modes_parse() {
    for mode in ["cash", "card", "cheque", "bank_transfer", "online"] {
        assert!(mode.parse::<PaymentMode>().is_ok(), "mode {mode} should parse");
    }
}

#[test]
fn test_unknown_payment_mode_rejected() {
    assert!("bitcoin".parse::<PaymentMode>().is_err());
    assert!("CASH".parse::<PaymentMode>().is_err());
}

#[test]
fn test_all_fee_frequencies_parse() {
    for freq in ["one_time", "monthly", "quarterly", "yearly"] {
        assert!(freq.parse::<FeeFrequency>().is_ok(), "frequency {freq} should parse");
    }
}

#[test]
fn test_unknown_fee_frequency_rejected() {
    assert!("weekly".parse::<FeeFrequency>().is_err());
    assert!("one-time".parse::<FeeFrequency>().is_err());
}

#[test]
fn test_session_status_parse() {
    assert_eq!("active".parse::<SessionStatus>().unwrap(), SessionStatus::Active);
    assert_eq!(
        "inactive".parse::<SessionStatus>().unwrap(),
        SessionStatus::Inactive
    );
    assert!("archived".parse::<SessionStatus>().is_err());
}

// ============================================================================
// Id Parsing
// ============================================================================

#[test]
fn test_valid_uuid_parses() {
    assert!(Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").is_ok());
}

#[test]
fn test_malformed_uuid_rejected() {
    assert!(Uuid::parse_str("not-a-uuid").is_err());
    assert!(Uuid::parse_str("").is_err());
    assert!(Uuid::parse_str("67e55044-10b1-426f-9247").is_err());
}

#[test]
fn test_uuid_with_injection_rejected() {
    assert!(Uuid::parse_str("'; DROP TABLE students; --").is_err());
}
