use std::sync::Arc;

use crate::llm::prompts::MOOD_CLASSIFICATION_PROMPT;
use crate::llm::{ChatBackend, CompletionOptions};
use crate::models::Mood;

/// Best-effort mapping of a user utterance onto the closed mood set.
#[derive(Clone)]
pub struct MoodClassifier {
    backend: Arc<dyn ChatBackend>,
}

impl MoodClassifier {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self { backend }
    }

    /// Returns `None` when the model fails or answers with no valid token.
    /// Never propagates upstream errors.
    pub async fn classify(&self, text: &str) -> Option<Mood> {
        let options = CompletionOptions {
            temperature: Some(0.0),
            max_tokens: Some(16),
            stop: None,
        };

        let output = match self
            .backend
            .generate(MOOD_CLASSIFICATION_PROMPT, &[], text, Some(&options))
            .await
        {
            Ok(output) => output,
            Err(error) => {
                tracing::warn!(error = %error, "Mood classification failed");
                return None;
            }
        };

        let mood = Mood::from_model_output(&output);
        if mood.is_none() {
            tracing::debug!(output = %output.trim(), "Classifier returned no recognised mood token");
        }
        mood
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MindmateError, Result};
    use crate::models::Turn;
    use async_trait::async_trait;

    struct Fixed(std::result::Result<&'static str, &'static str>);

    #[async_trait]
    impl ChatBackend for Fixed {
        async fn generate(
            &self,
            instruction: &str,
            history: &[Turn],
            _input: &str,
            _options: Option<&CompletionOptions>,
        ) -> Result<String> {
            assert_eq!(instruction, MOOD_CLASSIFICATION_PROMPT);
            assert!(history.is_empty());
            self.0
                .map(str::to_string)
                .map_err(|msg| MindmateError::Llm(msg.to_string()))
        }
    }

    fn classifier(reply: std::result::Result<&'static str, &'static str>) -> MoodClassifier {
        MoodClassifier::new(Arc::new(Fixed(reply)))
    }

    #[tokio::test]
    async fn test_classifies_single_emoji() {
        assert_eq!(classifier(Ok("😔")).classify("i feel low").await, Some(Mood::Sad));
    }

    #[tokio::test]
    async fn test_chatty_output_still_maps() {
        assert_eq!(
            classifier(Ok("The mood here is 😥.")).classify("exams tomorrow").await,
            Some(Mood::Distressed)
        );
    }

    #[tokio::test]
    async fn test_unrecognised_output_is_none() {
        assert_eq!(classifier(Ok("🙂")).classify("ok").await, None);
    }

    #[tokio::test]
    async fn test_upstream_error_is_none() {
        assert_eq!(classifier(Err("boom")).classify("hello").await, None);
    }
}
