//! Receipt number generation.
//!
//! Format: `RCP-YYYYMMDD-XXXXXXXXXX` where the suffix is 10 uppercase hex
//! characters drawn from a fresh UUID. Uniqueness is backstopped by the
//! UNIQUE constraint on fee_transactions.receipt_no; a collision surfaces as
//! a conflict for the caller to resubmit, matching the no-retry policy.

use chrono::NaiveDate;
use uuid::Uuid;

/// Generate a receipt number for the given collection date.
pub fn generate(date: NaiveDate) -> String {
    let suffix = hex::encode_upper(&Uuid::new_v4().as_bytes()[..5]);
    format!("RCP-{}-{}", date.format("%Y%m%d"), suffix)
}
