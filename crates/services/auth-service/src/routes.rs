//! Route configuration.

use axum::Router;
use tower_http::cors::CorsLayer;

use crate::handlers::{auth_routes, health_routes};
use crate::state::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/health", health_routes())
        .merge(auth_routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
