//! REST API handlers

pub mod auth;
pub mod classes;
pub mod fee_structure;
pub mod fee_transactions;
pub mod health;
pub mod sessions;
pub mod shared;
pub mod student_fees;
pub mod students;
pub mod users;

pub use auth::*;
pub use classes::*;
pub use fee_structure::*;
pub use fee_transactions::*;
pub use health::*;
pub use sessions::*;
pub use student_fees::*;
pub use students::*;
pub use users::*;
