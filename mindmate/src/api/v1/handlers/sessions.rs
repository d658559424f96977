//! v1 session and chat handlers.

use axum::extract::{Multipart, Path, State};
use validator::Validate;

use crate::api::extractors::AppJson;
use crate::api::v1::dto::{
    CreateSessionResponse, DeleteSessionResponse, SendMessageRequest, SessionResponse,
    TurnOutcomeResponse, VoiceMessageResponse,
};
use crate::api::v1::response::{ApiError, ApiResponse, ErrorCode};
use crate::api::AppState;

const MAX_SESSION_ID_LENGTH: usize = 64;

fn validate_session_id(id: &str) -> Result<(), &'static str> {
    let valid = !id.is_empty()
        && id.len() <= MAX_SESSION_ID_LENGTH
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err("Session id must be 1-64 characters of [A-Za-z0-9_-]")
    }
}

/// `POST /api/v1/sessions`
#[utoipa::path(
    post,
    path = "/api/v1/sessions",
    tag = "sessions",
    responses(
        (status = 201, description = "Session created", body = CreateSessionResponse),
    )
)]
pub async fn create_session(State(state): State<AppState>) -> ApiResponse<CreateSessionResponse> {
    let handle = state.sessions.create().await;
    let session_id = handle.lock().await.id.clone();
    ApiResponse::created(CreateSessionResponse { session_id })
}

/// `GET /api/v1/sessions/{sessionId}`
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{sessionId}",
    tag = "sessions",
    params(("sessionId" = String, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session state", body = SessionResponse),
        (status = 404, description = "Session not found", body = ApiError),
    )
)]
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResponse<SessionResponse> {
    match state.sessions.get(&session_id).await {
        Some(handle) => ApiResponse::success(handle.lock().await.snapshot().into()),
        None => ApiResponse::error(
            ErrorCode::NotFound,
            format!("Session {session_id} not found"),
        ),
    }
}

/// `DELETE /api/v1/sessions/{sessionId}`
///
/// Ends the session. History and counters are discarded; the mood journal is
/// untouched.
#[utoipa::path(
    delete,
    path = "/api/v1/sessions/{sessionId}",
    tag = "sessions",
    params(("sessionId" = String, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session ended", body = DeleteSessionResponse),
        (status = 404, description = "Session not found", body = ApiError),
    )
)]
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResponse<DeleteSessionResponse> {
    if state.sessions.remove(&session_id).await {
        ApiResponse::success(DeleteSessionResponse {
            session_id,
            deleted: true,
        })
    } else {
        ApiResponse::error(
            ErrorCode::NotFound,
            format!("Session {session_id} not found"),
        )
    }
}

/// `POST /api/v1/sessions/{sessionId}/messages`
///
/// Runs one chat turn. Unknown session ids start a new session.
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{sessionId}/messages",
    tag = "sessions",
    params(("sessionId" = String, Path, description = "Session ID")),
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Assistant reply", body = TurnOutcomeResponse),
        (status = 400, description = "Invalid request", body = ApiError),
    )
)]
pub async fn send_message(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    AppJson(req): AppJson<SendMessageRequest>,
) -> ApiResponse<TurnOutcomeResponse> {
    if let Err(e) = validate_session_id(&session_id) {
        return ApiResponse::error(ErrorCode::InvalidRequest, e);
    }

    if let Err(e) = req.validate() {
        return ApiResponse::error(ErrorCode::InvalidRequest, e.to_string());
    }

    let session = state.sessions.get_or_create(&session_id).await;
    match state.pipeline.handle_turn(&session, &req.message).await {
        Ok(outcome) => ApiResponse::success(outcome.into()),
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/sessions/{sessionId}/voice`
///
/// Accepts a multipart form with an `audio` field, transcribes it and runs the
/// transcript through the chat turn.
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{sessionId}/voice",
    tag = "sessions",
    params(("sessionId" = String, Path, description = "Session ID")),
    request_body(content_type = "multipart/form-data", content = String, description = "Audio upload in the `audio` field"),
    responses(
        (status = 200, description = "Transcript and assistant reply", body = VoiceMessageResponse),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 501, description = "Transcription not configured", body = ApiError),
    )
)]
pub async fn send_voice_message(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    mut multipart: Multipart,
) -> ApiResponse<VoiceMessageResponse> {
    if let Err(e) = validate_session_id(&session_id) {
        return ApiResponse::error(ErrorCode::InvalidRequest, e);
    }

    let mut audio: Option<(Vec<u8>, Option<String>)> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return ApiResponse::error(
                    ErrorCode::InvalidRequest,
                    format!("Invalid multipart body: {e}"),
                );
            }
        };
        if field.name() != Some("audio") {
            continue;
        }

        let extension = field
            .file_name()
            .and_then(|name| std::path::Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);

        let bytes = match field.bytes().await {
            Ok(b) => b,
            Err(e) => {
                return ApiResponse::error(
                    ErrorCode::InvalidRequest,
                    format!("Failed to read audio: {e}"),
                );
            }
        };

        if bytes.len() as u64 > state.transcription.max_file_size() {
            return ApiResponse::error(
                ErrorCode::InvalidRequest,
                format!(
                    "File too large: {} bytes (max {} bytes)",
                    bytes.len(),
                    state.transcription.max_file_size()
                ),
            );
        }

        audio = Some((bytes.to_vec(), extension));
    }

    let Some((bytes, extension)) = audio else {
        return ApiResponse::error(ErrorCode::InvalidRequest, "Missing required 'audio' field");
    };

    let transcript = match state
        .transcription
        .transcribe(&bytes, extension.as_deref())
        .await
    {
        Ok(text) => text,
        Err(e) => return e.into(),
    };

    let session = state.sessions.get_or_create(&session_id).await;
    match state.pipeline.handle_turn(&session, &transcript).await {
        Ok(outcome) => ApiResponse::success(VoiceMessageResponse {
            transcript,
            outcome: outcome.into(),
        }),
        Err(e) => e.into(),
    }
}
