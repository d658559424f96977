//! v1 mood journal handlers.

use axum::extract::State;
use validator::Validate;

use crate::api::extractors::AppJson;
use crate::api::v1::dto::{
    ListMoodsResponse, MoodChartResponse, MoodEntryResponse, TrackMoodRequest,
};
use crate::api::v1::response::{ApiError, ApiResponse, ErrorCode, ResponseMeta};
use crate::api::AppState;
use crate::models::{Mood, MoodSample};
use crate::mood::chart_series;

/// `GET /api/v1/moods`
#[utoipa::path(
    get,
    path = "/api/v1/moods",
    tag = "moods",
    responses(
        (status = 200, description = "Every journal entry in insertion order", body = ListMoodsResponse),
    )
)]
pub async fn list_moods(State(state): State<AppState>) -> ApiResponse<ListMoodsResponse> {
    match state.mood_log.load_all().await {
        Ok(samples) => {
            let total = samples.len() as u64;
            ApiResponse::success_with_meta(
                ListMoodsResponse {
                    entries: samples.into_iter().map(Into::into).collect(),
                },
                ResponseMeta { total: Some(total) },
            )
        }
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/moods`
///
/// Records a mood the user picked themselves. Session counters are not
/// affected.
#[utoipa::path(
    post,
    path = "/api/v1/moods",
    tag = "moods",
    request_body = TrackMoodRequest,
    responses(
        (status = 201, description = "Mood recorded", body = MoodEntryResponse),
        (status = 400, description = "Unknown mood", body = ApiError),
    )
)]
pub async fn track_mood(
    State(state): State<AppState>,
    AppJson(req): AppJson<TrackMoodRequest>,
) -> ApiResponse<MoodEntryResponse> {
    if let Err(e) = req.validate() {
        return ApiResponse::error(ErrorCode::InvalidRequest, e.to_string());
    }

    let mood: Mood = match req.mood.parse() {
        Ok(mood) => mood,
        Err(e) => return ApiResponse::error(ErrorCode::InvalidRequest, e),
    };

    let sample = MoodSample::now(mood);
    match state.mood_log.append(&sample).await {
        Ok(()) => ApiResponse::created(sample.into()),
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/moods/chart`
///
/// Valence series for the mood history chart. An unreadable journal yields an
/// empty series.
#[utoipa::path(
    get,
    path = "/api/v1/moods/chart",
    tag = "moods",
    responses(
        (status = 200, description = "Time-ordered valence series", body = MoodChartResponse),
    )
)]
pub async fn mood_chart(State(state): State<AppState>) -> ApiResponse<MoodChartResponse> {
    let samples = match state.mood_log.load_all().await {
        Ok(samples) => samples,
        Err(e) => {
            tracing::error!(error = %e, "Failed to read mood log for chart");
            Vec::new()
        }
    };

    ApiResponse::success(MoodChartResponse {
        points: chart_series(&samples).into_iter().map(Into::into).collect(),
    })
}
