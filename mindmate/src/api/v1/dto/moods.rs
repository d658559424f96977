//! Mood journal and chart DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{ChartPoint, Mood, MoodSample};

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntryResponse {
    #[schema(value_type = String)]
    pub timestamp: DateTime<Utc>,
    pub mood: Mood,
    pub emoji: String,
}

impl From<MoodSample> for MoodEntryResponse {
    fn from(sample: MoodSample) -> Self {
        Self {
            timestamp: sample.timestamp,
            mood: sample.mood,
            emoji: sample.mood.emoji().to_string(),
        }
    }
}

/// Response for `GET /v1/moods`. Entries are in insertion order.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListMoodsResponse {
    pub entries: Vec<MoodEntryResponse>,
}

/// Request body for `POST /v1/moods`.
///
/// `mood` accepts a tag word (`"sad"`) or its emoji (`"😔"`).
#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackMoodRequest {
    #[validate(length(min = 1, max = 32))]
    pub mood: String,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChartPointResponse {
    #[schema(value_type = String)]
    pub timestamp: DateTime<Utc>,
    pub mood: Mood,
    pub score: f64,
}

impl From<ChartPoint> for ChartPointResponse {
    fn from(point: ChartPoint) -> Self {
        Self {
            timestamp: point.timestamp,
            mood: point.mood,
            score: point.score,
        }
    }
}

/// Response for `GET /v1/moods/chart`, ordered by time.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoodChartResponse {
    pub points: Vec<ChartPointResponse>,
}
