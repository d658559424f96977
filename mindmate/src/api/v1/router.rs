use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::api::state::AppState;

use super::handlers;
use super::middleware::v1_auth_middleware;

pub fn v1_router(state: AppState) -> Router<AppState> {
    let sessions = Router::new()
        .route("/", post(handlers::sessions::create_session))
        .route(
            "/{sessionId}",
            get(handlers::sessions::get_session).delete(handlers::sessions::delete_session),
        )
        .route(
            "/{sessionId}/messages",
            post(handlers::sessions::send_message),
        )
        .route(
            "/{sessionId}/voice",
            post(handlers::sessions::send_voice_message),
        );

    let moods = Router::new()
        .route(
            "/",
            get(handlers::moods::list_moods).post(handlers::moods::track_mood),
        )
        .route("/chart", get(handlers::moods::mood_chart));

    let speech = Router::new()
        .route("/{jobId}", get(handlers::speech::get_speech_job))
        .route("/{jobId}/audio", get(handlers::speech::get_speech_audio));

    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/openapi.json", get(super::openapi::openapi_json))
        .merge(super::openapi::redoc_router());

    let protected_routes = Router::new()
        .nest("/sessions", sessions)
        .nest("/moods", moods)
        .nest("/speech", speech)
        .route_layer(middleware::from_fn_with_state(state, v1_auth_middleware));

    Router::new().merge(public_routes).merge(protected_routes)
}
