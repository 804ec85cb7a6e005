//! JWT token management

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AuthError;

/// Algorithms accepted on verification. Anything outside the HMAC family
/// (RSA, EC, `none`) is rejected before the signature is looked at.
const HMAC_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Shortest configurable token lifetime
pub const MIN_TOKEN_EXPIRY_HOURS: i64 = 1;

/// Longest configurable token lifetime (one year)
pub const MAX_TOKEN_EXPIRY_HOURS: i64 = 24 * 365;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Authenticated user ID
    pub user_id: i64,
    /// Issued at (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Expiration time (Unix timestamp), only set when expiry is configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

/// JWT manager for token generation and validation
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_hours: Option<i64>,
}

impl JwtManager {
    /// Create a new JWT manager
    ///
    /// With `token_expiry_hours` unset, issued tokens carry no `exp` claim
    /// and stay valid until the secret changes. A set lifetime is clamped to
    /// [`MIN_TOKEN_EXPIRY_HOURS`, `MAX_TOKEN_EXPIRY_HOURS`].
    pub fn new(secret: &str, token_expiry_hours: Option<i64>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_expiry_hours: token_expiry_hours
                .map(|hours| hours.clamp(MIN_TOKEN_EXPIRY_HOURS, MAX_TOKEN_EXPIRY_HOURS)),
        }
    }

    /// Generate an HS256 token for a user
    pub fn generate_token(&self, user_id: i64) -> Result<String, AuthError> {
        let now = Utc::now();

        let claims = Claims {
            user_id,
            iat: Some(now.timestamp()),
            exp: self
                .token_expiry_hours
                .map(|hours| (now + Duration::hours(hours)).timestamp()),
        };

        debug!("Generating token for user {}", user_id);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(AuthError::Jwt)
    }

    /// Validate a token and return its claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = HMAC_ALGORITHMS.to_vec();
        // `exp` is optional, but enforced whenever it is present
        validation.required_spec_claims.clear();
        validation.validate_exp = true;

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => {
                        debug!("Token rejected: {}", e);
                        AuthError::InvalidToken
                    }
                }
            })?;

        Ok(token_data.claims)
    }
}
