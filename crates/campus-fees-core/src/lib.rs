//! Campus Fees Core - Fee management business logic
//!
//! Template fan-out onto students, balance-guarded payment collection with
//! generated receipt numbers, and collection reporting over the student_fees
//! and fee_transactions tables.

pub mod error;
pub mod receipt;
pub mod service;

pub use error::FeeError;
pub use service::{
    AssignmentOutcome, CollectionSummary, DailyCollections, DayBreakdown, FeeService,
    FeeServiceImpl, FeeSummaryLine, ModeBreakdown, MonthlyCollections, PaymentReceipt,
    PaymentRequest, StudentFeeSummary,
};
