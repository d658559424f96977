use serde::{Deserialize, Serialize};

use super::Mood;

/// Self-help resource surfaced when a mood keeps recurring in a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub mood: Mood,
    pub name: String,
    pub description: String,
    pub link: String,
}

pub const SUGGESTION_DISCLAIMER: &str =
    "This is not a diagnosis. Please consult a healthcare professional for any concerns.";
