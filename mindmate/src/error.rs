use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::api::v1::response::ApiResponse;

#[derive(Error, Debug)]
pub enum MindmateError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Mood log error: {0}")]
    Csv(#[from] csv::Error),

    #[error("API authentication error: {0}")]
    ApiAuth(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("LLM unavailable: {0}")]
    LlmUnavailable(String),

    #[error("LLM rate limit exceeded, retry after {retry_after:?} seconds")]
    LlmRateLimit { retry_after: Option<u64> },

    #[error("Transcription error: {0}")]
    Transcription(String),

    #[error("Transcription unavailable: {0}")]
    TranscriptionUnavailable(String),

    #[error("Speech synthesis error: {0}")]
    Speech(String),

    #[error("Speech synthesis unavailable: {0}")]
    SpeechUnavailable(String),
}

impl IntoResponse for MindmateError {
    fn into_response(self) -> Response {
        ApiResponse::<()>::from(self).into_response()
    }
}

pub type Result<T> = std::result::Result<T, MindmateError>;
