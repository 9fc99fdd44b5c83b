//! Health check handlers.

use axum::{response::Json, routing::get, Router};

use common::JsonResponse;

/// Create health routes.
pub fn health_routes() -> Router {
    Router::new().route("/", get(health_check))
}

/// Liveness only; the broker has no backing store.
pub async fn health_check() -> Json<JsonResponse<()>> {
    Json(JsonResponse::message_only("ok"))
}
