//! Route configuration.

use axum::Router;
use tower_http::cors::CorsLayer;

use crate::handlers::{broker_routes, health_routes};

/// Create the main router with all routes.
pub fn create_router() -> Router {
    Router::new()
        .nest("/health", health_routes())
        .merge(broker_routes())
        .layer(CorsLayer::permissive())
}
