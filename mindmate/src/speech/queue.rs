use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::{MindmateError, Result};

use super::SpeechProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SpeechJobState {
    Queued,
    Done,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechJob {
    pub id: String,
    pub state: SpeechJobState,
    pub error: Option<String>,
    #[serde(skip)]
    pub audio_path: Option<PathBuf>,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

type JobTable = Arc<RwLock<HashMap<String, SpeechJob>>>;

struct SpeechTask {
    id: String,
    text: String,
}

/// Bounded queue of text-to-speech jobs drained by a single worker.
///
/// Enqueueing never waits on synthesis; results are only visible through the
/// job table.
#[derive(Clone)]
pub struct SpeechQueue {
    sender: mpsc::Sender<SpeechTask>,
    jobs: JobTable,
    max_jobs: usize,
}

impl SpeechQueue {
    /// Spawns the worker. It stops when `cancel` fires or every queue handle
    /// is dropped. At most `max_jobs` finished jobs are remembered; older ones
    /// are forgotten and their audio deleted.
    pub fn start(
        provider: SpeechProvider,
        output_dir: impl Into<PathBuf>,
        capacity: usize,
        max_jobs: usize,
        cancel: CancellationToken,
    ) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let jobs: JobTable = Arc::new(RwLock::new(HashMap::new()));

        let worker = SpeechWorker {
            provider,
            output_dir: output_dir.into(),
            jobs: jobs.clone(),
        };
        let handle = tokio::spawn(worker.run(receiver, cancel));

        (
            Self {
                sender,
                jobs,
                max_jobs: max_jobs.max(1),
            },
            handle,
        )
    }

    pub async fn enqueue(&self, text: &str) -> String {
        let id = Uuid::new_v4().to_string();
        let mut job = SpeechJob {
            id: id.clone(),
            state: SpeechJobState::Queued,
            error: None,
            audio_path: None,
            created_at: Utc::now(),
            finished_at: None,
        };

        let task = SpeechTask {
            id: id.clone(),
            text: text.to_string(),
        };

        // Record the job before the worker can see it.
        let mut jobs = self.jobs.write().await;
        if let Err(error) = self.sender.try_send(task) {
            let reason = match error {
                mpsc::error::TrySendError::Full(_) => "Speech queue is full",
                mpsc::error::TrySendError::Closed(_) => "Speech worker is not running",
            };
            tracing::warn!(job_id = %id, "{}", reason);
            job.state = SpeechJobState::Failed;
            job.error = Some(reason.to_string());
            job.finished_at = Some(Utc::now());
        }
        jobs.insert(id.clone(), job);
        let expired = prune_finished(&mut jobs, self.max_jobs);
        drop(jobs);

        for path in expired {
            if let Err(error) = tokio::fs::remove_file(&path).await {
                tracing::warn!(path = %path.display(), error = %error, "Failed to delete expired speech audio");
            }
        }

        id
    }

    pub async fn status(&self, id: &str) -> Option<SpeechJob> {
        self.jobs.read().await.get(id).cloned()
    }

    /// Synthesized audio for a finished job.
    pub async fn audio(&self, id: &str) -> Result<Vec<u8>> {
        let job = self
            .status(id)
            .await
            .ok_or_else(|| MindmateError::NotFound(format!("Speech job {id} not found")))?;

        match (job.state, job.audio_path) {
            (SpeechJobState::Done, Some(path)) => Ok(tokio::fs::read(path).await?),
            (SpeechJobState::Failed, _) => Err(MindmateError::NotFound(format!(
                "Speech job {id} failed: {}",
                job.error.unwrap_or_default()
            ))),
            _ => Err(MindmateError::NotFound(format!(
                "Speech job {id} has no audio yet"
            ))),
        }
    }
}

struct SpeechWorker {
    provider: SpeechProvider,
    output_dir: PathBuf,
    jobs: JobTable,
}

impl SpeechWorker {
    async fn run(self, mut receiver: mpsc::Receiver<SpeechTask>, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Speech worker shutting down...");
                    break;
                }
                task = receiver.recv() => {
                    let Some(task) = task else {
                        break;
                    };
                    let outcome = self.process(&task).await;
                    self.finish(&task.id, outcome).await;
                }
            }
        }
    }

    async fn process(&self, task: &SpeechTask) -> Result<PathBuf> {
        let audio = self.provider.synthesize(&task.text).await?;
        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = audio_path(&self.output_dir, &task.id);
        tokio::fs::write(&path, audio).await?;
        Ok(path)
    }

    async fn finish(&self, id: &str, outcome: Result<PathBuf>) {
        let mut jobs = self.jobs.write().await;
        let Some(job) = jobs.get_mut(id) else {
            return;
        };

        job.finished_at = Some(Utc::now());
        match outcome {
            Ok(path) => {
                tracing::debug!(job_id = %id, path = %path.display(), "Speech job done");
                job.state = SpeechJobState::Done;
                job.audio_path = Some(path);
            }
            Err(error) => {
                tracing::warn!(job_id = %id, error = %error, "Speech job failed");
                job.state = SpeechJobState::Failed;
                job.error = Some(error.to_string());
            }
        }
    }
}

/// Forgets the oldest finished jobs beyond `keep`, returning their audio files.
fn prune_finished(jobs: &mut HashMap<String, SpeechJob>, keep: usize) -> Vec<PathBuf> {
    let mut finished: Vec<(DateTime<Utc>, String)> = jobs
        .values()
        .filter_map(|job| job.finished_at.map(|at| (at, job.id.clone())))
        .collect();
    if finished.len() <= keep {
        return Vec::new();
    }

    finished.sort();
    let excess = finished.len() - keep;
    finished
        .into_iter()
        .take(excess)
        .filter_map(|(_, id)| jobs.remove(&id))
        .filter_map(|job| job.audio_path)
        .collect()
}

fn audio_path(output_dir: &Path, id: &str) -> PathBuf {
    output_dir.join(format!("{id}.mp3"))
}
