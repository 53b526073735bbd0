//! Campus Academic Core - Session lifecycle business logic
//!
//! Owns the single-active-session rule, advisory date-overlap checks, and
//! per-session statistics. Talks to storage through the repository traits in
//! campus-db.

pub mod dates;
pub mod error;
pub mod service;

pub use dates::{days_remaining, elapsed_percent, ranges_overlap};
pub use error::AcademicError;
pub use service::{
    ConflictingSession, DateValidation, NewSession, SessionService, SessionServiceImpl,
    SessionStats, SessionUpdate,
};
