//! Application state

use stockroom_auth::JwtManager;
use stockroom_db::Database;
use std::sync::Arc;

pub use metrics_exporter_prometheus::PrometheusHandle as MetricsHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
    /// When false, item routes are mounted without the auth gate and every
    /// item query is unscoped
    pub auth_enabled: bool,
    /// Restrict `GET /items?name=` to the caller's own items
    pub scoped_search: bool,
}

impl AppState {
    pub fn new(db: Database, jwt: Arc<JwtManager>, auth_enabled: bool, scoped_search: bool) -> Self {
        Self {
            db,
            jwt,
            auth_enabled,
            scoped_search,
        }
    }
}
