//! Request DTOs

use serde::Deserialize;

// ==================== Account Types ====================

/// Registration request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

// ==================== Item Types ====================

/// Item create/update body
///
/// Missing fields default to empty/zero. Any `id` or `user_id` in the body
/// is ignored: the owner always comes from the token and the id from the
/// stored record.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ItemPayload {
    pub name: String,
    pub qty: i64,
}

/// Query parameters for `GET /items`
#[derive(Debug, Default, Deserialize)]
pub struct ListItemsQuery {
    pub name: Option<String>,
}

impl ListItemsQuery {
    /// The name filter, treating `?name=` the same as no filter
    pub fn name_filter(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }
}
