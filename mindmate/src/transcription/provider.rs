use std::time::Duration;

use tracing::{info, warn};

use crate::config::{parse_provider_model, TranscriptionConfig};
use crate::error::{MindmateError, Result};

use super::api::TranscriptionApiClient;

#[derive(Clone)]
enum TranscriptionBackend {
    Api { client: TranscriptionApiClient },
    Unavailable { reason: String },
}

/// Speech-to-text for voice messages, ahead of the chat pipeline.
#[derive(Clone)]
pub struct TranscriptionProvider {
    backend: TranscriptionBackend,
    config: TranscriptionConfig,
}

impl TranscriptionProvider {
    pub fn new(config: &TranscriptionConfig) -> Self {
        let (provider, _model_name) = parse_provider_model(&config.model);

        let backend = match TranscriptionApiClient::new(config) {
            Ok(client) => {
                info!(provider = %provider, "Transcription API backend initialized");
                TranscriptionBackend::Api { client }
            }
            Err(e) => {
                let reason = format!("Transcription API backend unavailable: {e}");
                warn!("{}", reason);
                TranscriptionBackend::Unavailable { reason }
            }
        };

        Self {
            backend,
            config: config.clone(),
        }
    }

    pub fn unavailable(reason: &str) -> Self {
        Self {
            backend: TranscriptionBackend::Unavailable {
                reason: reason.to_string(),
            },
            config: TranscriptionConfig::default(),
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self.backend, TranscriptionBackend::Unavailable { .. })
    }

    pub fn max_file_size(&self) -> u64 {
        self.config.max_file_size
    }

    pub async fn transcribe(&self, audio_bytes: &[u8], file_extension: Option<&str>) -> Result<String> {
        if audio_bytes.is_empty() {
            return Err(MindmateError::Validation("Audio payload is empty".to_string()));
        }

        if audio_bytes.len() as u64 > self.config.max_file_size {
            return Err(MindmateError::Validation(format!(
                "Audio payload exceeds {} bytes",
                self.config.max_file_size
            )));
        }

        let timeout_duration = Duration::from_secs(self.config.timeout_secs);

        let result = tokio::time::timeout(
            timeout_duration,
            self.transcribe_internal(audio_bytes, file_extension),
        )
        .await;

        match result {
            Ok(inner_result) => inner_result,
            Err(_) => Err(MindmateError::Transcription(format!(
                "Transcription timed out after {} seconds",
                self.config.timeout_secs
            ))),
        }
    }

    async fn transcribe_internal(&self, audio_bytes: &[u8], file_extension: Option<&str>) -> Result<String> {
        match &self.backend {
            TranscriptionBackend::Api { client } => client.transcribe(audio_bytes, file_extension).await,
            TranscriptionBackend::Unavailable { reason } => {
                Err(MindmateError::TranscriptionUnavailable(reason.clone()))
            }
        }
    }
}
