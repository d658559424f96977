use async_trait::async_trait;

use crate::config::{parse_llm_provider_model, LlmConfig};
use crate::error::{MindmateError, Result};
use crate::llm::api::LlmApiClient;
use crate::models::Turn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmBackend {
    OpenAI,
    OpenRouter,
    Ollama,
    LmStudio,
    OpenAICompatible { base_url: String },
    Unavailable { reason: String },
}

#[derive(Debug, Clone, Default)]
pub struct CompletionOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub stop: Option<Vec<String>>,
}

/// Text generation seam shared by the mood classifier and the reply generator.
///
/// `history` holds the prior turns only; `input` is the new user utterance and
/// is sent after them.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn generate(
        &self,
        instruction: &str,
        history: &[Turn],
        input: &str,
        options: Option<&CompletionOptions>,
    ) -> Result<String>;
}

#[derive(Clone)]
pub struct LlmProvider {
    backend: LlmBackend,
    client: Option<LlmApiClient>,
}

impl LlmProvider {
    pub fn new(config: Option<&LlmConfig>) -> Self {
        let Some(config) = config else {
            return Self::unavailable("No LLM configuration provided");
        };

        let (provider, _model) = parse_llm_provider_model(&config.model);

        let backend = match provider.to_lowercase().as_str() {
            "openai" => LlmBackend::OpenAI,
            "openrouter" => LlmBackend::OpenRouter,
            "ollama" => LlmBackend::Ollama,
            "lmstudio" => LlmBackend::LmStudio,
            _ => {
                if let Some(base_url) = &config.base_url {
                    LlmBackend::OpenAICompatible {
                        base_url: base_url.clone(),
                    }
                } else {
                    return Self::unavailable(&format!(
                        "Unknown provider in model: {}",
                        config.model
                    ));
                }
            }
        };

        match LlmApiClient::new(config) {
            Ok(client) => Self {
                backend,
                client: Some(client),
            },
            Err(error) => {
                tracing::warn!(model = %config.model, error = %error, "LLM client unavailable");
                Self::unavailable(&error.to_string())
            }
        }
    }

    pub fn unavailable(reason: &str) -> Self {
        Self {
            backend: LlmBackend::Unavailable {
                reason: reason.to_string(),
            },
            client: None,
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self.backend, LlmBackend::Unavailable { .. })
    }

    pub fn backend(&self) -> &LlmBackend {
        &self.backend
    }

    pub fn model(&self) -> Option<&str> {
        self.client.as_ref().map(LlmApiClient::model)
    }

    fn unavailable_reason(&self) -> String {
        match &self.backend {
            LlmBackend::Unavailable { reason } => reason.clone(),
            _ => "LLM client was not initialised".to_string(),
        }
    }
}

#[async_trait]
impl ChatBackend for LlmProvider {
    async fn generate(
        &self,
        instruction: &str,
        history: &[Turn],
        input: &str,
        options: Option<&CompletionOptions>,
    ) -> Result<String> {
        let client = self
            .client
            .as_ref()
            .filter(|_| self.is_available())
            .ok_or_else(|| MindmateError::LlmUnavailable(self.unavailable_reason()))?;

        client.chat(instruction, history, input, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(model: &str) -> LlmConfig {
        LlmConfig {
            model: model.to_string(),
            api_key: Some("sk-test".to_string()),
            base_url: None,
            timeout_secs: 30,
            max_retries: 0,
        }
    }

    #[test]
    fn test_backend_from_provider_prefix() {
        assert_eq!(
            LlmProvider::new(Some(&config("openai/gpt-4o-mini"))).backend(),
            &LlmBackend::OpenAI
        );
        assert_eq!(
            LlmProvider::new(Some(&config("openrouter/meta-llama/llama-3-8b"))).backend(),
            &LlmBackend::OpenRouter
        );
        assert_eq!(
            LlmProvider::new(Some(&config("ollama/llama3.1"))).backend(),
            &LlmBackend::Ollama
        );
        assert_eq!(
            LlmProvider::new(Some(&config("lmstudio/qwen2"))).backend(),
            &LlmBackend::LmStudio
        );
    }

    #[test]
    fn test_unknown_provider_with_base_url_is_compatible() {
        let cfg = LlmConfig {
            base_url: Some("http://llm.internal/v1".to_string()),
            ..config("gemma-2b")
        };
        let provider = LlmProvider::new(Some(&cfg));
        assert_eq!(
            provider.backend(),
            &LlmBackend::OpenAICompatible {
                base_url: "http://llm.internal/v1".to_string()
            }
        );
        assert_eq!(provider.model(), Some("gemma-2b"));
    }

    #[test]
    fn test_unknown_provider_without_base_url_is_unavailable() {
        let provider = LlmProvider::new(Some(&config("gemma-2b")));
        assert!(!provider.is_available());
    }

    #[test]
    fn test_missing_api_key_is_unavailable() {
        let cfg = LlmConfig {
            api_key: None,
            ..config("openai/gpt-4o-mini")
        };
        let provider = LlmProvider::new(Some(&cfg));
        assert!(!provider.is_available());
    }

    #[tokio::test]
    async fn test_generate_without_config_fails_unavailable() {
        let provider = LlmProvider::new(None);
        let result = provider.generate("sys", &[], "hello", None).await;
        assert!(matches!(result, Err(MindmateError::LlmUnavailable(_))));
    }
}
