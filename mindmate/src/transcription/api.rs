use std::time::Duration;

use reqwest::{multipart, Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    config::{default_api_base, parse_provider_model, TranscriptionConfig},
    error::{MindmateError, Result},
};

const MAX_RETRIES: u32 = 3;

#[derive(Debug, Clone, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Debug, Clone)]
pub struct TranscriptionApiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl TranscriptionApiClient {
    pub fn new(config: &TranscriptionConfig) -> Result<Self> {
        let (provider, model) = parse_provider_model(&config.model);

        let api_key = config.api_key.clone().ok_or_else(|| {
            MindmateError::Transcription("API key required for transcription API".to_string())
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MindmateError::Transcription(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| default_api_base(provider).to_string()),
            model: model.to_string(),
            api_key,
        })
    }

    pub async fn transcribe(&self, audio_bytes: &[u8], file_extension: Option<&str>) -> Result<String> {
        let mut last_error: Option<MindmateError> = None;

        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                // 100ms, 200ms, 400ms
                let delay_ms = 100 * 2_u64.pow(attempt - 1);
                debug!("Retry attempt {} after {}ms", attempt, delay_ms);
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }

            match self.transcribe_internal(audio_bytes, file_extension).await {
                Ok(text) => return Ok(text),
                Err((retryable, e)) => {
                    if retryable && attempt < MAX_RETRIES {
                        warn!(
                            "Transcription attempt {} failed (retryable): {}",
                            attempt + 1,
                            e
                        );
                        last_error = Some(e);
                        continue;
                    }

                    return Err(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            MindmateError::Transcription("Transcription failed after retries".to_string())
        }))
    }

    /// Errors carry whether the attempt may be retried.
    async fn transcribe_internal(
        &self,
        audio_bytes: &[u8],
        file_extension: Option<&str>,
    ) -> std::result::Result<String, (bool, MindmateError)> {
        let extension = file_extension.unwrap_or("mp3");
        let file_part = multipart::Part::bytes(audio_bytes.to_vec())
            .file_name(format!("audio.{extension}"))
            .mime_str(&infer_mime_type(extension))
            .map_err(|e| (false, MindmateError::Transcription(format!("Invalid MIME type: {e}"))))?;

        let form = multipart::Form::new()
            .part("file", file_part)
            .text("model", self.model.clone())
            .text("response_format", "json");

        let url = format!("{}/audio/transcriptions", self.base_url.trim_end_matches('/'));
        debug!("Sending transcription request to {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                let retryable = e.is_timeout() || e.is_connect();
                (retryable, MindmateError::Transcription(format!("Request failed: {e}")))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());

            return Err((status.is_server_error(), map_http_error(status, &error_body)));
        }

        let parsed: TranscriptionResponse = response.json().await.map_err(|e| {
            (
                false,
                MindmateError::Transcription(format!("Failed to parse transcription response: {e}")),
            )
        })?;

        if parsed.text.trim().is_empty() {
            return Err((
                false,
                MindmateError::Transcription("Transcription response contained empty text".to_string()),
            ));
        }

        Ok(parsed.text.trim().to_string())
    }
}

fn infer_mime_type(extension: &str) -> String {
    mime_guess::from_ext(extension)
        .first()
        .filter(|mime| matches!(mime.type_().as_str(), "audio" | "video"))
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| "audio/mpeg".to_string())
}

fn map_http_error(status: StatusCode, error_body: &str) -> MindmateError {
    match status {
        StatusCode::UNAUTHORIZED => MindmateError::Transcription(format!(
            "Authentication failed (401): Invalid API key. Error: {error_body}"
        )),
        StatusCode::TOO_MANY_REQUESTS => MindmateError::Transcription(format!(
            "Rate limit exceeded (429): Too many requests. Error: {error_body}"
        )),
        _ => MindmateError::Transcription(format!(
            "Transcription API error ({status}): {error_body}"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn test_config(base_url: Option<String>) -> TranscriptionConfig {
        TranscriptionConfig {
            model: "openai/whisper-1".to_string(),
            api_key: Some("test-api-key".to_string()),
            base_url,
            timeout_secs: 10,
            max_file_size: 25 * 1024 * 1024,
        }
    }

    #[test]
    fn test_api_client_creation_no_api_key() {
        let mut config = test_config(None);
        config.api_key = None;

        let result = TranscriptionApiClient::new(&config);
        assert!(matches!(result, Err(MindmateError::Transcription(_))));
    }

    #[test]
    fn test_provider_prefix_is_stripped() {
        let client = TranscriptionApiClient::new(&test_config(None)).unwrap();
        assert_eq!(client.model, "whisper-1");
        assert_eq!(client.base_url, "https://api.openai.com/v1");
    }

    #[tokio::test]
    async fn test_api_multipart_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/audio/transcriptions"))
            .and(header("Authorization", "Bearer test-api-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "text": " main theek hoon "
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = TranscriptionApiClient::new(&test_config(Some(mock_server.uri()))).unwrap();
        let result = client.transcribe(b"fake audio data", Some("webm")).await;
        assert_eq!(result.unwrap(), "main theek hoon");
    }

    #[tokio::test]
    async fn test_api_error_401_is_not_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/audio/transcriptions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = TranscriptionApiClient::new(&test_config(Some(mock_server.uri()))).unwrap();
        let error = client.transcribe(b"audio", None).await.unwrap_err();
        assert!(error.to_string().contains("401"));
    }

    #[tokio::test]
    async fn test_api_error_500_is_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/audio/transcriptions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .expect(4)
            .mount(&mock_server)
            .await;

        let client = TranscriptionApiClient::new(&test_config(Some(mock_server.uri()))).unwrap();
        let error = client.transcribe(b"audio", None).await.unwrap_err();
        assert!(error.to_string().contains("500"));
    }

    #[test]
    fn test_infer_mime_type() {
        assert_eq!(infer_mime_type("mp3"), "audio/mpeg");
        assert_eq!(infer_mime_type("unknown-ext"), "audio/mpeg");
    }
}
