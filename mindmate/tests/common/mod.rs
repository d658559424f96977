// Common test utilities for integration tests
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Mutex, Once};

use async_trait::async_trait;

use mindmate::error::{MindmateError, Result};
use mindmate::llm::prompts::MOOD_CLASSIFICATION_PROMPT;
use mindmate::llm::{ChatBackend, CompletionOptions};
use mindmate::models::Turn;

static INIT: Once = Once::new();

/// Initialize tracing subscriber once for tests
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// Backend that answers classification requests from a script and replies
/// with a numbered echo of the input.
///
/// An exhausted script answers with text that carries no mood token.
pub struct ScriptedBackend {
    moods: Mutex<VecDeque<String>>,
    fail_replies: bool,
    pub reply_histories: Mutex<Vec<Vec<Turn>>>,
}

impl ScriptedBackend {
    pub fn new(moods: &[&str]) -> Self {
        Self {
            moods: Mutex::new(moods.iter().map(|m| m.to_string()).collect()),
            fail_replies: false,
            reply_histories: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_replies(mut self) -> Self {
        self.fail_replies = true;
        self
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn generate(
        &self,
        instruction: &str,
        history: &[Turn],
        input: &str,
        _options: Option<&CompletionOptions>,
    ) -> Result<String> {
        if instruction == MOOD_CLASSIFICATION_PROMPT {
            let next = self.moods.lock().unwrap().pop_front();
            return Ok(next.unwrap_or_else(|| "no idea".to_string()));
        }

        if self.fail_replies {
            return Err(MindmateError::Llm("scripted failure".to_string()));
        }

        let mut histories = self.reply_histories.lock().unwrap();
        histories.push(history.to_vec());
        Ok(format!("reply {}: {input}", histories.len()))
    }
}

// Re-export commonly used crates for convenience
pub use serial_test::serial;
pub use tempfile;
pub use wiremock;
