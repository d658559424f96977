use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::v1;
use super::AppState;

/// Multipart overhead allowed on top of the largest accepted audio file.
const BODY_LIMIT_SLACK: usize = 64 * 1024;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = usize::try_from(state.config.transcription.max_file_size)
        .unwrap_or(usize::MAX)
        .saturating_add(BODY_LIMIT_SLACK);

    let v1 = v1::router::v1_router(state.clone());

    Router::new()
        .nest("/api/v1", v1)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
