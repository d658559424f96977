//! Speech job DTOs.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::speech::{SpeechJob, SpeechJobState};

/// Response for `GET /v1/speech/{jobId}`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpeechJobResponse {
    pub job_id: String,
    pub state: SpeechJobState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub finished_at: Option<DateTime<Utc>>,
}

impl From<SpeechJob> for SpeechJobResponse {
    fn from(job: SpeechJob) -> Self {
        Self {
            job_id: job.id,
            state: job.state,
            error: job.error,
            created_at: job.created_at,
            finished_at: job.finished_at,
        }
    }
}
