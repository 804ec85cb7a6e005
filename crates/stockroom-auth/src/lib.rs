//! Stockroom Authentication
//!
//! This crate issues and verifies the HMAC-signed JWTs that identify a
//! user, hashes account passwords, and provides the Axum middleware that
//! gates item routes behind a bearer token.

pub mod error;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use error::AuthError;
pub use jwt::{Claims, JwtManager, MAX_TOKEN_EXPIRY_HOURS, MIN_TOKEN_EXPIRY_HOURS};
pub use middleware::{AuthUser, auth_middleware};
pub use password::{DUMMY_HASH, hash_password, verify_password};
