use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::dto;
use super::handlers;
use super::response;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "MindMate API",
        version = "1.0.0",
        description = "Mood-aware conversational companion for students. Chat sessions, mood journal and voice I/O.",
    ),
    paths(
        handlers::health::health_check,
        handlers::sessions::create_session,
        handlers::sessions::get_session,
        handlers::sessions::delete_session,
        handlers::sessions::send_message,
        handlers::sessions::send_voice_message,
        handlers::moods::list_moods,
        handlers::moods::track_mood,
        handlers::moods::mood_chart,
        handlers::speech::get_speech_job,
        handlers::speech::get_speech_audio,
    ),
    components(schemas(
        // Response envelope
        response::ErrorCode,
        response::ApiError,
        response::ResponseMeta,
        // Domain enums
        crate::models::Mood,
        crate::models::Role,
        crate::speech::SpeechJobState,
        // Sessions
        dto::sessions::CreateSessionResponse,
        dto::sessions::SendMessageRequest,
        dto::sessions::SuggestionResponse,
        dto::sessions::TurnOutcomeResponse,
        dto::sessions::VoiceMessageResponse,
        dto::sessions::TurnResponse,
        dto::sessions::MoodCountResponse,
        dto::sessions::SessionResponse,
        dto::sessions::DeleteSessionResponse,
        // Moods
        dto::moods::MoodEntryResponse,
        dto::moods::ListMoodsResponse,
        dto::moods::TrackMoodRequest,
        dto::moods::ChartPointResponse,
        dto::moods::MoodChartResponse,
        // Speech
        dto::speech::SpeechJobResponse,
        // Health (handler-local types)
        handlers::health::HealthData,
        handlers::health::LlmStatus,
    )),
    tags(
        (name = "health", description = "Health check"),
        (name = "sessions", description = "Chat sessions, text and voice messages"),
        (name = "moods", description = "Mood journal and history chart"),
        (name = "speech", description = "Text-to-speech jobs for assistant replies"),
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            utoipa::openapi::security::SecurityScheme::Http(utoipa::openapi::security::Http::new(
                utoipa::openapi::security::HttpAuthScheme::Bearer,
            )),
        );
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
