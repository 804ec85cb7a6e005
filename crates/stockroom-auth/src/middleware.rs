//! Authentication middleware for Axum

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::AuthError;
use crate::jwt::{Claims, JwtManager};

/// Authenticated user information
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
}

impl AuthUser {
    /// Create from JWT claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self { id: claims.user_id }
    }
}

/// Extract bearer token from authorization header
fn extract_bearer_token(header: &str) -> Result<&str, AuthError> {
    header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthHeader)
}

/// Authentication middleware
///
/// Requires a valid `Authorization: Bearer <token>` header. On success the
/// [`AuthUser`] is added to the request extensions; otherwise the request is
/// answered with 401 and never reaches the handler.
pub async fn auth_middleware(
    State(jwt_manager): State<Arc<JwtManager>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingAuthHeader)?;

    let token = extract_bearer_token(header)?;
    let claims = jwt_manager.validate_token(token).inspect_err(|e| {
        warn!("Rejected bearer token: {}", e);
    })?;
    let user = AuthUser::from_claims(&claims);

    debug!("Authenticated user: {}", user.id);

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Typed accessor for the identity bound by [`auth_middleware`]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or(AuthError::MissingAuthHeader)
    }
}
