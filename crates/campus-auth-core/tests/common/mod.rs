//! Common test utilities for campus-auth-core integration tests

pub mod mock_repos;

#[allow(unused_imports)]
pub use mock_repos::{MockAuthTokenRepository, MockUserRepository};
