use async_trait::async_trait;

use crate::error::Result;
use crate::models::MoodSample;

/// Append-only journal of mood samples shared by every session.
#[async_trait]
pub trait MoodLog: Send + Sync {
    async fn append(&self, sample: &MoodSample) -> Result<()>;
    /// All samples in insertion order.
    async fn load_all(&self) -> Result<Vec<MoodSample>>;
}
