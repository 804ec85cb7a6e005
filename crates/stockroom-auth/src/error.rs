//! Authentication error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Email or password invalid")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Missing authorization header")]
    MissingAuthHeader,

    #[error("Invalid authorization header format")]
    InvalidAuthHeader,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token encoding error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials => StatusCode::BAD_REQUEST,
            AuthError::PasswordHash(_) | AuthError::Jwt(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader => StatusCode::UNAUTHORIZED,
        }
    }

    /// Message safe to return to the client
    ///
    /// Token failures carry an empty message so a caller cannot tell a
    /// malformed token from a forged one.
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "Email or password invalid",
            AuthError::PasswordHash(_) | AuthError::Jwt(_) => "Internal error",
            _ => "",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = axum::Json(json!({
            "success": false,
            "message": self.public_message(),
            "data": null
        }));

        (self.status_code(), body).into_response()
    }
}
