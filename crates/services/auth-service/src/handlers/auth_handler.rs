//! Authentication handlers.

use axum::{extract::State, http::StatusCode, response::Json, routing::post, Router};
use serde::Deserialize;
use validator::Validate;

use common::{AppResult, JsonResponse};
use domain::UserResponse;

use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// Credential check request with validation
#[derive(Debug, Deserialize, Validate)]
pub struct AuthenticateRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/authenticate", post(authenticate))
}

/// Check an email/password pair against the stored credential.
pub async fn authenticate(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<AuthenticateRequest>,
) -> AppResult<(StatusCode, Json<JsonResponse<UserResponse>>)> {
    let user = state
        .authenticator
        .authenticate(&payload.email, &payload.password)
        .await?;

    let message = format!("Logged in user {}", user.email);
    Ok((
        StatusCode::ACCEPTED,
        Json(JsonResponse::success(message, UserResponse::from(user))),
    ))
}
