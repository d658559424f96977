use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::{ApiError, OpenAIError},
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
        Stop,
    },
    Client,
};

use crate::{
    config::{default_api_base, parse_llm_provider_model, LlmConfig},
    error::{MindmateError, Result},
    llm::provider::CompletionOptions,
    models::{Role, Turn},
};

#[derive(Debug, Clone)]
struct ApiConfig {
    base_url: String,
    api_key: Option<String>,
    model: String,
    timeout_secs: u64,
    max_retries: u32,
}

#[derive(Clone)]
pub struct LlmApiClient {
    client: Client<OpenAIConfig>,
    config: ApiConfig,
}

impl LlmApiClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_config = ApiConfig::from_llm_config(config);

        let (provider, _) = parse_llm_provider_model(&config.model);
        let needs_api_key = !matches!(
            provider.to_lowercase().as_str(),
            "ollama" | "local" | "lmstudio"
        );

        if needs_api_key && api_config.api_key.is_none() {
            return Err(MindmateError::Llm(
                "API key required for this provider".to_string(),
            ));
        }

        let openai_config = OpenAIConfig::new()
            .with_api_base(api_config.base_url.clone())
            .with_api_key(api_config.api_key.clone().unwrap_or_default());

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(api_config.timeout_secs))
            .build()
            .map_err(|error| {
                MindmateError::Llm(format!("Failed to create LLM HTTP client: {error}"))
            })?;

        // async-openai retries 5xx internally for up to 15 minutes unless its
        // backoff is capped; keep it inside our own request timeout.
        let backoff = backoff::ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(api_config.timeout_secs)),
            ..Default::default()
        };

        let client = Client::with_config(openai_config)
            .with_http_client(http_client)
            .with_backoff(backoff);

        Ok(Self {
            client,
            config: api_config,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Run a chat completion over `instruction`, the prior `history` and the
    /// new `input`, returning the assistant text.
    pub async fn chat(
        &self,
        instruction: &str,
        history: &[Turn],
        input: &str,
        options: Option<&CompletionOptions>,
    ) -> Result<String> {
        if input.trim().is_empty() {
            return Err(MindmateError::Validation("Prompt cannot be empty".to_string()));
        }

        let mut last_error: Option<MindmateError> = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let delay_ms = 100 * 2_u64.pow(attempt - 1);
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }

            let request = self.build_request(instruction, history, input, options)?;

            match self.client.chat().create(request).await {
                Ok(response) => return Self::extract_content(response),
                Err(error) => {
                    if let Some(rate_limit_error) = Self::rate_limit_error(&error) {
                        return Err(rate_limit_error);
                    }

                    if let Some(auth_error) = Self::auth_error(&error) {
                        return Err(auth_error);
                    }

                    let retryable = Self::is_retryable(&error);
                    let mapped_error = Self::map_openai_error(error);

                    if retryable && attempt < self.config.max_retries {
                        tracing::debug!(attempt, error = %mapped_error, "Retrying LLM request");
                        last_error = Some(mapped_error);
                        continue;
                    }

                    return Err(mapped_error);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| MindmateError::Llm("LLM completion failed after retries".to_string())))
    }

    fn build_request(
        &self,
        instruction: &str,
        history: &[Turn],
        input: &str,
        options: Option<&CompletionOptions>,
    ) -> Result<CreateChatCompletionRequest> {
        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::with_capacity(history.len() + 2);

        if !instruction.trim().is_empty() {
            messages.push(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(instruction)
                    .build()
                    .map_err(|error| {
                        MindmateError::Validation(format!("Invalid system prompt: {error}"))
                    })?
                    .into(),
            );
        }

        for turn in history {
            let message: ChatCompletionRequestMessage = match turn.role {
                Role::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(turn.text.as_str())
                    .build()
                    .map_err(|error| {
                        MindmateError::Validation(format!("Invalid history turn: {error}"))
                    })?
                    .into(),
                Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(turn.text.as_str())
                    .build()
                    .map_err(|error| {
                        MindmateError::Validation(format!("Invalid history turn: {error}"))
                    })?
                    .into(),
            };
            messages.push(message);
        }

        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(input)
                .build()
                .map_err(|error| {
                    MindmateError::Validation(format!("Invalid user prompt: {error}"))
                })?
                .into(),
        );

        let mut request = CreateChatCompletionRequestArgs::default();
        request.model(self.config.model.clone()).messages(messages);
        Self::apply_completion_options(&mut request, options);

        request.build().map_err(|error| {
            MindmateError::Validation(format!("Invalid LLM completion request: {error}"))
        })
    }

    fn apply_completion_options(
        request: &mut CreateChatCompletionRequestArgs,
        options: Option<&CompletionOptions>,
    ) {
        let Some(options) = options else {
            return;
        };

        if let Some(temperature) = options.temperature {
            request.temperature(temperature);
        }

        if let Some(max_tokens) = options.max_tokens {
            request.max_tokens(max_tokens);
        }

        if let Some(stop) = options.stop.as_ref().filter(|values| !values.is_empty()) {
            request.stop(Stop::StringArray(stop.clone()));
        }
    }

    fn extract_content(response: CreateChatCompletionResponse) -> Result<String> {
        let message = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| MindmateError::Llm("LLM response contained no choices".to_string()))?
            .message
            .content
            .unwrap_or_default();

        if message.trim().is_empty() {
            return Err(MindmateError::Llm(
                "LLM response contained empty content".to_string(),
            ));
        }

        Ok(message)
    }

    fn is_retryable(error: &OpenAIError) -> bool {
        match error {
            OpenAIError::ApiError(api_error) => {
                api_error.r#type.is_none() && api_error.code.is_none()
            }
            OpenAIError::Reqwest(reqwest_error) => reqwest_error
                .status()
                .map(|status| status.is_server_error())
                .unwrap_or(true),
            _ => false,
        }
    }

    fn rate_limit_error(error: &OpenAIError) -> Option<MindmateError> {
        match error {
            OpenAIError::Reqwest(reqwest_error)
                if reqwest_error.status() == Some(reqwest::StatusCode::TOO_MANY_REQUESTS) =>
            {
                Some(MindmateError::LlmRateLimit { retry_after: None })
            }
            OpenAIError::ApiError(api_error) if Self::is_rate_limit_api_error(api_error) => {
                Some(MindmateError::LlmRateLimit { retry_after: None })
            }
            _ => None,
        }
    }

    fn auth_error(error: &OpenAIError) -> Option<MindmateError> {
        match error {
            OpenAIError::Reqwest(reqwest_error)
                if reqwest_error.status() == Some(reqwest::StatusCode::UNAUTHORIZED)
                    || reqwest_error.status() == Some(reqwest::StatusCode::FORBIDDEN) =>
            {
                Some(MindmateError::Llm(format!(
                    "LLM authentication failed: {reqwest_error}"
                )))
            }
            OpenAIError::ApiError(api_error) if Self::is_auth_api_error(api_error) => Some(
                MindmateError::Llm(format!("LLM authentication failed: {api_error}")),
            ),
            _ => None,
        }
    }

    fn is_rate_limit_api_error(api_error: &ApiError) -> bool {
        let message = api_error.message.to_lowercase();
        let error_type = api_error.r#type.clone().unwrap_or_default().to_lowercase();
        let code = api_error.code.clone().unwrap_or_default().to_lowercase();

        message.contains("rate limit")
            || message.contains("too many requests")
            || error_type.contains("rate_limit")
            || code.contains("rate_limit")
            || code == "insufficient_quota"
    }

    fn is_auth_api_error(api_error: &ApiError) -> bool {
        let message = api_error.message.to_lowercase();
        let error_type = api_error.r#type.clone().unwrap_or_default().to_lowercase();
        let code = api_error.code.clone().unwrap_or_default().to_lowercase();

        message.contains("unauthorized")
            || message.contains("forbidden")
            || message.contains("authentication")
            || message.contains("invalid api key")
            || code.contains("invalid_api_key")
            || error_type.contains("authentication")
    }

    fn map_openai_error(error: OpenAIError) -> MindmateError {
        match error {
            OpenAIError::Reqwest(reqwest_error) => {
                MindmateError::Llm(format!("LLM request failed: {reqwest_error}"))
            }
            OpenAIError::ApiError(api_error) => {
                MindmateError::Llm(format!("LLM API error: {api_error}"))
            }
            OpenAIError::JSONDeserialize(err) => {
                MindmateError::Llm(format!("Failed to parse LLM response: {err}"))
            }
            OpenAIError::InvalidArgument(message) => MindmateError::Validation(message),
            other => MindmateError::Llm(other.to_string()),
        }
    }
}

impl ApiConfig {
    fn from_llm_config(config: &LlmConfig) -> Self {
        let (provider, model) = parse_llm_provider_model(&config.model);

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| default_api_base(provider).to_string());

        let normalized_model = if provider.eq_ignore_ascii_case("local") {
            config.model.clone()
        } else {
            model.to_string()
        };

        Self {
            base_url,
            api_key: config.api_key.clone(),
            model: normalized_model,
            timeout_secs: config.timeout_secs,
            max_retries: config.max_retries,
        }
    }
}
