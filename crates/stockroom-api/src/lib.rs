//! Stockroom REST API
//!
//! This crate provides the Axum-based HTTP API for Stockroom: account
//! registration and login, and per-user item management behind a bearer
//! token.

pub mod error;
pub mod extract;
pub mod response;
pub mod routes;
pub mod state;

#[cfg(test)]
mod test_support;

pub use error::ApiError;
pub use response::ApiResponse;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
