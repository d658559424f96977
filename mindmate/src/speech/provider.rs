use std::time::Duration;

use tracing::{info, warn};

use crate::config::SpeechConfig;
use crate::error::{MindmateError, Result};

use super::api::SpeechApiClient;

#[derive(Clone)]
enum SpeechBackend {
    Api { client: SpeechApiClient },
    Unavailable { reason: String },
}

/// Text-to-speech for assistant replies.
#[derive(Clone)]
pub struct SpeechProvider {
    backend: SpeechBackend,
    timeout_secs: u64,
}

impl SpeechProvider {
    pub fn new(config: &SpeechConfig) -> Self {
        let backend = match SpeechApiClient::new(config) {
            Ok(client) => {
                info!(model = %config.model, voice = %config.voice, "Speech API backend initialized");
                SpeechBackend::Api { client }
            }
            Err(e) => {
                let reason = format!("Speech API backend unavailable: {e}");
                warn!("{}", reason);
                SpeechBackend::Unavailable { reason }
            }
        };

        Self {
            backend,
            timeout_secs: config.timeout_secs,
        }
    }

    pub fn unavailable(reason: &str) -> Self {
        Self {
            backend: SpeechBackend::Unavailable {
                reason: reason.to_string(),
            },
            timeout_secs: SpeechConfig::default().timeout_secs,
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self.backend, SpeechBackend::Unavailable { .. })
    }

    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let client = match &self.backend {
            SpeechBackend::Api { client } => client,
            SpeechBackend::Unavailable { reason } => {
                return Err(MindmateError::SpeechUnavailable(reason.clone()))
            }
        };

        match tokio::time::timeout(Duration::from_secs(self.timeout_secs), client.synthesize(text)).await {
            Ok(result) => result,
            Err(_) => Err(MindmateError::Speech(format!(
                "Speech synthesis timed out after {} seconds",
                self.timeout_secs
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unavailable_without_key() {
        let provider = SpeechProvider::new(&SpeechConfig::default());
        assert!(!provider.is_available());
        assert!(matches!(
            provider.synthesize("hi").await,
            Err(MindmateError::SpeechUnavailable(_))
        ));
    }

    #[test]
    fn test_ollama_does_not_need_key() {
        let cfg = SpeechConfig {
            model: "ollama/piper".to_string(),
            ..SpeechConfig::default()
        };
        assert!(SpeechProvider::new(&cfg).is_available());
    }
}
