//! Common test utilities for campus-fees-core integration tests

pub mod mock_repos;

#[allow(unused_imports)]
pub use mock_repos::{MockFeeMasterRepository, MockLedger, MockStudentRepository};
