//! Notekeep Authentication
//!
//! This crate provides JWT issuance and validation, Argon2 password hashing,
//! and the Axum middleware that turns a bearer token into the current user.

pub mod error;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use error::{AuthError, NOT_AUTHORIZED};
pub use jwt::{Claims, DEFAULT_TOKEN_LIFETIME, JwtManager, parse_token_lifetime};
pub use middleware::{Authenticator, CurrentUser, auth_middleware};
pub use password::{hash_password, verify_password};
