use serde::Deserialize;
use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn env_non_empty(var: &str) -> Option<String> {
    env::var(var).ok().filter(|value| !value.trim().is_empty())
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: Option<LlmConfig>,
    pub mood: MoodConfig,
    pub chat: ChatConfig,
    pub transcription: TranscriptionConfig,
    pub speech: SpeechConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub api_keys: Vec<String>,
}

/// LLM configuration for chat/completion models
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

/// Mood tracking: classification, suggestion threshold and the CSV journal.
#[derive(Debug, Clone, Deserialize)]
pub struct MoodConfig {
    pub enabled: bool,
    pub threshold: u32,
    pub log_path: String,
    /// Separate model for classification. Falls back to the chat model.
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Number of most recent prior turns sent as context. `0` sends everything.
    pub history_window: usize,
    pub persona_prompt: Option<String>,
    /// Sessions without a turn for this long are dropped. `0` keeps them forever.
    pub session_idle_secs: u64,
    /// Live session cap; the least recently active session is evicted first.
    pub max_sessions: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub max_file_size: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpeechConfig {
    pub enabled: bool,
    pub model: String,
    pub voice: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub output_dir: String,
    pub queue_capacity: usize,
    /// Finished jobs kept (with their audio files) before the oldest are pruned.
    pub max_jobs: usize,
}

impl Default for MoodConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 3,
            log_path: "mood_log.csv".to_string(),
            model: None,
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_window: 10,
            persona_prompt: None,
            session_idle_secs: 3600,
            max_sessions: 10_000,
        }
    }
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            model: "openai/whisper-1".to_string(),
            api_key: None,
            base_url: None,
            timeout_secs: 300,
            max_file_size: 26214400,
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model: "openai/tts-1".to_string(),
            voice: "alloy".to_string(),
            api_key: None,
            base_url: None,
            timeout_secs: 60,
            output_dir: "speech".to_string(),
            queue_capacity: 32,
            max_jobs: 256,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("MINDMATE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("MINDMATE_PORT", 3000),
                api_keys: env::var("MINDMATE_API_KEYS")
                    .map(|keys| {
                        keys.split(',')
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty())
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            llm: env_non_empty("LLM_MODEL").map(|model| LlmConfig {
                model,
                api_key: env::var("LLM_API_KEY").ok(),
                base_url: env::var("LLM_BASE_URL").ok(),
                timeout_secs: parse_env_or("LLM_TIMEOUT", 30),
                max_retries: parse_env_or("LLM_MAX_RETRIES", 3),
            }),
            mood: MoodConfig {
                enabled: parse_env_or("ENABLE_MOOD_TRACKING", true),
                threshold: parse_env_or("MOOD_SUGGESTION_THRESHOLD", 3u32).max(1),
                log_path: env::var("MOOD_LOG_PATH").unwrap_or_else(|_| "mood_log.csv".to_string()),
                model: env_non_empty("MOOD_MODEL"),
            },
            chat: ChatConfig {
                history_window: parse_env_or("CHAT_HISTORY_WINDOW", 10),
                persona_prompt: env_non_empty("CHAT_PERSONA_PROMPT"),
                session_idle_secs: parse_env_or("SESSION_IDLE_TIMEOUT", 3600),
                max_sessions: parse_env_or("MAX_SESSIONS", 10_000usize).max(1),
            },
            transcription: TranscriptionConfig {
                model: env::var("TRANSCRIPTION_MODEL")
                    .unwrap_or_else(|_| "openai/whisper-1".to_string()),
                api_key: env::var("TRANSCRIPTION_API_KEY").ok(),
                base_url: env::var("TRANSCRIPTION_BASE_URL").ok(),
                timeout_secs: parse_env_or("TRANSCRIPTION_TIMEOUT", 300),
                max_file_size: parse_env_or("TRANSCRIPTION_MAX_FILE_SIZE", 26214400),
            },
            speech: SpeechConfig {
                enabled: parse_env_or("ENABLE_VOICE", false),
                model: env::var("SPEECH_MODEL").unwrap_or_else(|_| "openai/tts-1".to_string()),
                voice: env::var("SPEECH_VOICE").unwrap_or_else(|_| "alloy".to_string()),
                api_key: env::var("SPEECH_API_KEY").ok(),
                base_url: env::var("SPEECH_BASE_URL").ok(),
                timeout_secs: parse_env_or("SPEECH_TIMEOUT", 60),
                output_dir: env::var("SPEECH_OUTPUT_DIR").unwrap_or_else(|_| "speech".to_string()),
                queue_capacity: parse_env_or("SPEECH_QUEUE_CAPACITY", 32usize).max(1),
                max_jobs: parse_env_or("SPEECH_MAX_JOBS", 256usize).max(1),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }

    /// LLM configuration used by the mood classifier.
    ///
    /// Same endpoint and credentials as the chat model, with `MOOD_MODEL`
    /// swapped in when set.
    pub fn classifier_llm(&self) -> Option<LlmConfig> {
        let llm = self.llm.as_ref()?;
        Some(match &self.mood.model {
            Some(model) => LlmConfig {
                model: model.clone(),
                ..llm.clone()
            },
            None => llm.clone(),
        })
    }
}

/// Known audio providers that use OpenAI-compatible APIs
const KNOWN_PROVIDERS: &[&str] = &["openai", "openrouter", "ollama", "lmstudio", "local"];

/// Known LLM providers that use OpenAI-compatible APIs
pub const KNOWN_LLM_PROVIDERS: &[&str] = &["openai", "openrouter", "ollama", "lmstudio"];

/// Default OpenAI-compatible API base for a provider prefix.
pub fn default_api_base(provider: &str) -> &'static str {
    match provider.to_lowercase().as_str() {
        "openrouter" => "https://openrouter.ai/api/v1",
        "ollama" => "http://localhost:11434/v1",
        "lmstudio" => "http://localhost:1234/v1",
        _ => "https://api.openai.com/v1",
    }
}

/// Parse a model name into (provider, model) tuple.
pub fn parse_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    ("local", model)
}

/// Parse an LLM model name into (provider, model) tuple.
pub fn parse_llm_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_LLM_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    // Default to treating the whole string as a local model
    ("local", model)
}
