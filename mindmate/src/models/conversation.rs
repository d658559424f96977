use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Mood, Suggestion};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// One entry of a conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Result of running one user utterance through the chat pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub reply: String,
    /// Mood inferred for this utterance, if classification succeeded.
    pub mood: Option<Mood>,
    /// Suggestion emitted on this turn (threshold crossed).
    pub suggestion: Option<Suggestion>,
    pub crisis_detected: bool,
    pub crisis_keywords: Vec<String>,
    /// Background speech job started for the reply, when voice is enabled.
    pub speech_job_id: Option<String>,
}

/// Read-only view of a live session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: String,
    pub turns: Vec<Turn>,
    pub mood_counts: Vec<(Mood, u32)>,
    pub threshold: u32,
    pub pending_suggestion: Option<Suggestion>,
    pub crisis_flag: bool,
    pub crisis_keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
