//! Authentication extractor and account routes

use axum::{
    Router,
    extract::{FromRef, FromRequestParts, State},
    http::request::Parts,
    routing::post,
};
use stockroom_auth::{AuthError, AuthUser, DUMMY_HASH, hash_password, verify_password};
use stockroom_db::{NewUser, User};
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::response::ApiResponse;
use crate::state::AppState;

use super::types::{LoginRequest, RegisterRequest};

// ==================== Auth Extractor ====================

/// Caller identity for item routes
///
/// Holds the user bound by the auth gate, or `None` when authentication is
/// disabled and item queries run unscoped.
pub struct RequireAuth(pub Option<AuthUser>);

impl RequireAuth {
    /// Owner filter for item queries
    pub fn owner(&self) -> Option<i64> {
        self.0.map(|user| user.id)
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        if !app_state.auth_enabled {
            return Ok(RequireAuth(None));
        }

        let user = AuthUser::from_request_parts(parts, state).await?;
        Ok(RequireAuth(Some(user)))
    }
}

// ==================== Input Validation ====================

/// Maximum allowed password length (prevent DoS with very large passwords)
const MAX_PASSWORD_LENGTH: usize = 256;

fn validate_registration(request: &RegisterRequest) -> Result<(), ApiError> {
    if request.email.trim().is_empty() {
        return Err(ApiError::BadRequest("Email is required".to_string()));
    }
    if request.password.is_empty() {
        return Err(ApiError::BadRequest("Password is required".to_string()));
    }
    if request.password.len() > MAX_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password exceeds maximum length of {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

// ==================== Account Routes ====================

/// POST /register
async fn register(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> Result<ApiResponse<User>, ApiError> {
    validate_registration(&request)?;

    debug!("Registering user: {}", request.email);

    let password_hash = hash_password(&request.password)?;

    let user = state
        .db
        .insert_user(NewUser {
            full_name: request.full_name,
            email: request.email,
            password_hash,
        })
        .await?;

    metrics::counter!("stockroom_registrations_total").increment(1);
    info!("Registered user {} ({})", user.id, user.email);

    Ok(ApiResponse::success(user))
}

/// POST /login
async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<ApiResponse<String>, ApiError> {
    if request.password.len() > MAX_PASSWORD_LENGTH {
        return Err(AuthError::InvalidCredentials.into());
    }

    debug!("Login attempt for: {}", request.email);

    let user = state.db.get_user_by_email(&request.email).await?;

    // Unknown email and wrong password must be indistinguishable, including
    // in how long they take
    let verified = match user {
        Some(user) => verify_password(&request.password, &user.password_hash)?.then_some(user),
        None => {
            let _ = verify_password(&request.password, DUMMY_HASH);
            None
        }
    };

    let Some(user) = verified else {
        metrics::counter!("stockroom_logins_total", "outcome" => "rejected").increment(1);
        warn!("Failed login for: {}", request.email);
        return Err(AuthError::InvalidCredentials.into());
    };

    let token = state.jwt.generate_token(user.id)?;

    metrics::counter!("stockroom_logins_total", "outcome" => "success").increment(1);
    info!("User {} logged in", user.id);

    Ok(ApiResponse::success(token))
}

/// Create account routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}
