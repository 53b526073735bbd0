//! Campus Types - Shared domain types
//!
//! Common types used across campus services: user roles, academic session
//! status, fee enumerations, and the API response envelope.

pub mod api;
pub mod fee;
pub mod session;
pub mod user;

pub use api::ApiResponse;
pub use fee::{FeeFrequency, FeeStatus, PaymentMode};
pub use session::SessionStatus;
pub use user::Role;
