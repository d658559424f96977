//! Bearer key check for the session, mood and speech routes.

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::state::AppState;

use super::response::{ApiResponse, ErrorCode};

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn unauthorized(message: &str) -> Response {
    ApiResponse::<()>::error(ErrorCode::Unauthorized, message).into_response()
}

/// Rejects requests whose `Authorization: Bearer <key>` is not one of
/// `MINDMATE_API_KEYS`. With no keys configured every request is rejected,
/// so conversations and the mood journal are never served anonymously.
pub async fn v1_auth_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let keys = &state.config.server.api_keys;
    if keys.is_empty() {
        return unauthorized("Chat access is disabled until MINDMATE_API_KEYS is set");
    }

    match bearer_token(request.headers()) {
        Some(token) if keys.iter().any(|key| key == token) => next.run(request).await,
        Some(_) => unauthorized("Unknown API key"),
        None => unauthorized("Expected header: Authorization: Bearer <api key>"),
    }
}
