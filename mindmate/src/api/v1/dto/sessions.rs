//! Session and chat message DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{
    Mood, Role, SessionSnapshot, Suggestion, Turn, TurnOutcome, SUGGESTION_DISCLAIMER,
};

/// Upper bound on a single chat message, in characters.
pub const MAX_MESSAGE_LENGTH: u64 = 4000;

/// Response for `POST /v1/sessions`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub session_id: String,
}

/// Request body for `POST /v1/sessions/{id}/messages`.
#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[validate(length(min = 1, max = MAX_MESSAGE_LENGTH))]
    pub message: String,
}

/// Self-help resource with the standing disclaimer attached.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionResponse {
    pub mood: Mood,
    pub name: String,
    pub description: String,
    pub link: String,
    pub disclaimer: String,
}

impl From<Suggestion> for SuggestionResponse {
    fn from(s: Suggestion) -> Self {
        Self {
            mood: s.mood,
            name: s.name,
            description: s.description,
            link: s.link,
            disclaimer: SUGGESTION_DISCLAIMER.to_string(),
        }
    }
}

/// Result of one chat turn.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TurnOutcomeResponse {
    pub reply: String,
    /// Mood detected for the message; absent when classification failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<Mood>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood_emoji: Option<String>,
    /// Present only on the turn the mood threshold was reached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<SuggestionResponse>,
    pub crisis_detected: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub crisis_keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_job_id: Option<String>,
}

impl From<TurnOutcome> for TurnOutcomeResponse {
    fn from(outcome: TurnOutcome) -> Self {
        Self {
            reply: outcome.reply,
            mood: outcome.mood,
            mood_emoji: outcome.mood.map(|m| m.emoji().to_string()),
            suggestion: outcome.suggestion.map(Into::into),
            crisis_detected: outcome.crisis_detected,
            crisis_keywords: outcome.crisis_keywords,
            speech_job_id: outcome.speech_job_id,
        }
    }
}

/// Response for `POST /v1/sessions/{id}/voice`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoiceMessageResponse {
    pub transcript: String,
    #[serde(flatten)]
    pub outcome: TurnOutcomeResponse,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TurnResponse {
    pub role: Role,
    pub text: String,
    #[schema(value_type = String)]
    pub timestamp: DateTime<Utc>,
}

impl From<Turn> for TurnResponse {
    fn from(turn: Turn) -> Self {
        Self {
            role: turn.role,
            text: turn.text,
            timestamp: turn.timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoodCountResponse {
    pub mood: Mood,
    pub count: u32,
}

/// Response for `GET /v1/sessions/{id}`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: String,
    pub turns: Vec<TurnResponse>,
    pub mood_counts: Vec<MoodCountResponse>,
    pub threshold: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_suggestion: Option<SuggestionResponse>,
    pub crisis_flag: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub crisis_keywords: Vec<String>,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String)]
    pub updated_at: DateTime<Utc>,
}

impl From<SessionSnapshot> for SessionResponse {
    fn from(snapshot: SessionSnapshot) -> Self {
        Self {
            session_id: snapshot.id,
            turns: snapshot.turns.into_iter().map(Into::into).collect(),
            mood_counts: snapshot
                .mood_counts
                .into_iter()
                .map(|(mood, count)| MoodCountResponse { mood, count })
                .collect(),
            threshold: snapshot.threshold,
            pending_suggestion: snapshot.pending_suggestion.map(Into::into),
            crisis_flag: snapshot.crisis_flag,
            crisis_keywords: snapshot.crisis_keywords,
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
        }
    }
}

/// Response for `DELETE /v1/sessions/{id}`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSessionResponse {
    pub session_id: String,
    pub deleted: bool,
}
