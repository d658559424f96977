use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::error::{MindmateError, Result};
use crate::models::{Mood, MoodSample};
use crate::store::MoodLog;

const HEADER: &str = "timestamp,mood";
const LEGACY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// CSV-backed mood journal with a `timestamp,mood` header.
///
/// Each append is one `O_APPEND` write of a complete row, so concurrent
/// writers never interleave partial rows. Appends through one instance (and
/// its clones) are serialized: the header is written whenever the file is
/// empty, and a missing trailing newline is repaired before the new row.
#[derive(Debug, Clone)]
pub struct CsvMoodLog {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl CsvMoodLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn encode_row(sample: &MoodSample) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.write_record([
            sample.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            sample.mood.as_str().to_string(),
        ])?;
        writer
            .into_inner()
            .map_err(|error| MindmateError::Internal(format!("Failed to encode mood row: {error}")))
    }

    async fn ends_with_newline(file: &mut File, len: u64) -> Result<bool> {
        let mut last = [0u8; 1];
        file.seek(SeekFrom::Start(len - 1)).await?;
        file.read_exact(&mut last).await?;
        Ok(last[0] == b'\n')
    }

    fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, LEGACY_TIMESTAMP_FORMAT)
            .ok()
            .map(|naive| naive.and_utc())
    }

    fn parse_rows(&self, bytes: &[u8]) -> Vec<MoodSample> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let mut samples = Vec::new();
        for (index, record) in reader.records().enumerate() {
            // +2: one for the header, one for 1-based line numbers
            let line = index + 2;
            let record = match record {
                Ok(record) => record,
                Err(error) => {
                    tracing::warn!(path = %self.path.display(), line, error = %error, "Skipping unreadable mood row");
                    continue;
                }
            };

            let timestamp = record.get(0).and_then(Self::parse_timestamp);
            let mood = record.get(1).and_then(|cell| cell.parse::<Mood>().ok());

            match (timestamp, mood) {
                (Some(timestamp), Some(mood)) => samples.push(MoodSample::at(timestamp, mood)),
                _ => {
                    tracing::warn!(path = %self.path.display(), line, "Skipping malformed mood row");
                }
            }
        }
        samples
    }
}

#[async_trait]
impl MoodLog for CsvMoodLog {
    async fn append(&self, sample: &MoodSample) -> Result<()> {
        let row = Self::encode_row(sample)?;
        let _guard = self.write_lock.lock().await;

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&self.path)
            .await?;

        let len = file.metadata().await?.len();
        let mut buf = Vec::with_capacity(HEADER.len() + 2 + row.len());
        if len == 0 {
            buf.extend_from_slice(HEADER.as_bytes());
            buf.push(b'\n');
            tracing::debug!(path = %self.path.display(), "Writing mood log header");
        } else if !Self::ends_with_newline(&mut file, len).await? {
            // Rows from hand-edited or legacy logs may lack the final newline.
            buf.push(b'\n');
        }
        buf.extend_from_slice(&row);

        file.write_all(&buf).await?;
        file.flush().await?;

        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<MoodSample>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => return Err(error.into()),
        };
        Ok(self.parse_rows(&bytes))
    }
}
