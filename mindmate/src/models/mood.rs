use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Closed set of mood tags a user utterance can be classified into.
///
/// Declaration order is the token scan order used when mapping raw model
/// output back onto the set.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Happy,
    Neutral,
    Sad,
    Angry,
    Distressed,
}

impl Mood {
    pub const ALL: [Mood; 5] = [
        Mood::Happy,
        Mood::Neutral,
        Mood::Sad,
        Mood::Angry,
        Mood::Distressed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Neutral => "neutral",
            Self::Sad => "sad",
            Self::Angry => "angry",
            Self::Distressed => "distressed",
        }
    }

    /// Token the classification model is asked to answer with.
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Happy => "😊",
            Self::Neutral => "😐",
            Self::Sad => "😔",
            Self::Angry => "😠",
            Self::Distressed => "😥",
        }
    }

    /// Numeric weight used for the mood history chart.
    pub fn valence(&self) -> f64 {
        match self {
            Self::Happy => 2.0,
            Self::Neutral => 1.0,
            Self::Sad => -1.0,
            Self::Angry => -2.0,
            Self::Distressed => -1.5,
        }
    }

    /// Map free-form model output onto the closed set.
    ///
    /// Scans the valid tokens in [`Mood::ALL`] order and returns the first one
    /// contained anywhere in `output`. Returns `None` when no token is present.
    pub fn from_model_output(output: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|mood| output.contains(mood.emoji()))
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(mood) = Self::ALL.into_iter().find(|m| m.emoji() == trimmed) {
            return Ok(mood);
        }
        match trimmed.to_lowercase().as_str() {
            "happy" => Ok(Self::Happy),
            "neutral" => Ok(Self::Neutral),
            "sad" => Ok(Self::Sad),
            "angry" => Ok(Self::Angry),
            "distressed" => Ok(Self::Distressed),
            _ => Err(format!("Unknown mood: {s}")),
        }
    }
}

/// One observation of inferred user sentiment. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodSample {
    pub timestamp: DateTime<Utc>,
    pub mood: Mood,
}

impl MoodSample {
    /// Sample stamped with the current time at second precision.
    pub fn now(mood: Mood) -> Self {
        Self::at(Utc::now(), mood)
    }

    pub fn at(timestamp: DateTime<Utc>, mood: Mood) -> Self {
        Self {
            timestamp: timestamp.trunc_subsecs(0),
            mood,
        }
    }
}

/// A single point of the valence history chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub timestamp: DateTime<Utc>,
    pub mood: Mood,
    pub score: f64,
}
