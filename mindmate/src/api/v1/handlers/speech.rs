//! v1 speech job handlers.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::api::v1::dto::SpeechJobResponse;
use crate::api::v1::response::{ApiError, ApiResponse, ErrorCode};
use crate::api::AppState;

const VOICE_DISABLED: &str = "Voice output is disabled. Set ENABLE_VOICE=true to enable it.";

/// `GET /api/v1/speech/{jobId}`
#[utoipa::path(
    get,
    path = "/api/v1/speech/{jobId}",
    tag = "speech",
    params(("jobId" = String, Path, description = "Speech job ID")),
    responses(
        (status = 200, description = "Job status", body = SpeechJobResponse),
        (status = 404, description = "Job not found", body = ApiError),
        (status = 501, description = "Voice output disabled", body = ApiError),
    )
)]
pub async fn get_speech_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResponse<SpeechJobResponse> {
    let Some(queue) = &state.speech else {
        return ApiResponse::error(ErrorCode::NotImplemented, VOICE_DISABLED);
    };

    match queue.status(&job_id).await {
        Some(job) => ApiResponse::success(job.into()),
        None => ApiResponse::error(
            ErrorCode::NotFound,
            format!("Speech job {job_id} not found"),
        ),
    }
}

/// `GET /api/v1/speech/{jobId}/audio`
///
/// Raw `audio/mpeg` bytes of a finished job.
#[utoipa::path(
    get,
    path = "/api/v1/speech/{jobId}/audio",
    tag = "speech",
    params(("jobId" = String, Path, description = "Speech job ID")),
    responses(
        (status = 200, description = "Synthesized audio", content_type = "audio/mpeg"),
        (status = 404, description = "Job not found or not finished", body = ApiError),
        (status = 501, description = "Voice output disabled", body = ApiError),
    )
)]
pub async fn get_speech_audio(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Response {
    let Some(queue) = &state.speech else {
        return ApiResponse::<()>::error(ErrorCode::NotImplemented, VOICE_DISABLED).into_response();
    };

    match queue.audio(&job_id).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "audio/mpeg")], bytes).into_response(),
        Err(e) => ApiResponse::<()>::from(e).into_response(),
    }
}
