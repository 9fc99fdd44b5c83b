use axum::{http::StatusCode, response::Json, routing::post, Router};

use common::JsonResponse;

/// Create broker routes.
pub fn broker_routes() -> Router {
    Router::new().route("/", post(broker))
}

/// Acknowledge a hit on the broker.
pub async fn broker() -> (StatusCode, Json<JsonResponse<()>>) {
    (
        StatusCode::ACCEPTED,
        Json(JsonResponse::message_only("Hit the broker")),
    )
}
