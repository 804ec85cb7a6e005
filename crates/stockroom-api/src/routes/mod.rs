//! API routes

mod auth;
mod health;
mod items;
pub mod metrics;
mod types;

use axum::{Router, middleware};
use std::sync::Arc;
use stockroom_auth::auth_middleware;
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::state::{AppState, MetricsHandle};

/// Create the main router
pub fn create_router(state: AppState, metrics_handle: Option<Arc<MetricsHandle>>) -> Router {
    let mut item_routes = items::routes();
    if state.auth_enabled {
        item_routes = item_routes.route_layer(middleware::from_fn_with_state(
            state.jwt.clone(),
            auth_middleware,
        ));
    } else {
        warn!("Authentication is disabled; item routes are unscoped");
    }

    let mut router = Router::new()
        // Root and health checks
        .merge(health::routes())
        // Registration and login
        .merge(auth::routes())
        // Item CRUD
        .merge(item_routes)
        .with_state(state);

    // Add metrics endpoint if handle is provided
    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    router.layer(CorsLayer::permissive())
}
