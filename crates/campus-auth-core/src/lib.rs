//! Campus Auth Core - Authentication business logic
//!
//! Password verification, HMAC-signed bearer tokens, and server-side token
//! revocation backed by the users and auth_tokens tables.

pub mod config;
pub mod crypto;
pub mod error;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use crypto::{constant_time_eq, hash_password, hash_token, verify_password, HmacKey, HmacKeyError};
pub use error::AuthError;
pub use service::{AuthService, AuthServiceImpl, AuthenticatedUser, IssuedToken};
pub use token::{sign_token, verify_token, TokenPayload};
