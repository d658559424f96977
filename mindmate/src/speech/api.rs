use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::debug;

use crate::{
    config::{default_api_base, parse_provider_model, SpeechConfig},
    error::{MindmateError, Result},
};

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
}

/// Client for OpenAI-compatible `POST {base}/audio/speech`.
#[derive(Debug, Clone)]
pub struct SpeechApiClient {
    client: Client,
    base_url: String,
    model: String,
    voice: String,
    api_key: Option<String>,
}

impl SpeechApiClient {
    pub fn new(config: &SpeechConfig) -> Result<Self> {
        let (provider, model) = parse_provider_model(&config.model);
        let needs_api_key = !matches!(
            provider.to_lowercase().as_str(),
            "ollama" | "local" | "lmstudio"
        );

        if needs_api_key && config.api_key.is_none() {
            return Err(MindmateError::Speech(
                "API key required for speech API".to_string(),
            ));
        }

        if provider.eq_ignore_ascii_case("local") && config.base_url.is_none() {
            return Err(MindmateError::Speech(
                "SPEECH_BASE_URL required for a local speech server".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MindmateError::Speech(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| default_api_base(provider).to_string()),
            model: model.to_string(),
            voice: config.voice.clone(),
            api_key: config.api_key.clone(),
        })
    }

    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let url = format!("{}/audio/speech", self.base_url.trim_end_matches('/'));
        debug!(url = %url, chars = text.len(), "Sending speech request");

        let mut request = self.client.post(&url).json(&SpeechRequest {
            model: &self.model,
            input: text,
            voice: &self.voice,
            response_format: "mp3",
        });
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                MindmateError::Speech("Request timeout".to_string())
            } else {
                MindmateError::Speech(format!("Request failed: {e}"))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => MindmateError::Speech(format!(
                    "Authentication failed ({status}): {error_body}"
                )),
                _ => MindmateError::Speech(format!("Speech API error ({status}): {error_body}")),
            });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(MindmateError::Speech(
                "Speech response contained no audio".to_string(),
            ));
        }

        Ok(bytes.to_vec())
    }
}
