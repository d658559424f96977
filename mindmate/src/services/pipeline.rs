use std::sync::Arc;

use crate::config::Config;
use crate::error::{MindmateError, Result};
use crate::llm::prompts::{persona_prompt, FALLBACK_REPLY};
use crate::llm::ChatBackend;
use crate::models::{MoodSample, Turn, TurnOutcome};
use crate::mood::MoodClassifier;
use crate::services::crisis::detect_crisis_keywords;
use crate::services::session::SessionHandle;
use crate::speech::SpeechQueue;
use crate::store::MoodLog;

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub mood_tracking: bool,
    /// Prior turns sent with each request; 0 sends the whole history.
    pub history_window: usize,
    pub persona_prompt: String,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            mood_tracking: config.mood.enabled,
            history_window: config.chat.history_window,
            persona_prompt: persona_prompt(config.chat.persona_prompt.as_deref()).to_string(),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            mood_tracking: true,
            history_window: 10,
            persona_prompt: persona_prompt(None).to_string(),
        }
    }
}

/// Runs one user utterance through classification, logging, the suggestion
/// trigger and reply generation.
///
/// Only invalid input is returned as an error. Upstream and persistence
/// failures degrade the turn instead.
#[derive(Clone)]
pub struct ChatPipeline {
    replies: Arc<dyn ChatBackend>,
    classifier: MoodClassifier,
    mood_log: Arc<dyn MoodLog>,
    speech: Option<SpeechQueue>,
    settings: PipelineSettings,
}

impl ChatPipeline {
    pub fn new(
        replies: Arc<dyn ChatBackend>,
        classifier: MoodClassifier,
        mood_log: Arc<dyn MoodLog>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            replies,
            classifier,
            mood_log,
            speech: None,
            settings,
        }
    }

    pub fn with_speech(mut self, speech: SpeechQueue) -> Self {
        self.speech = Some(speech);
        self
    }

    pub fn mood_log(&self) -> &Arc<dyn MoodLog> {
        &self.mood_log
    }

    pub async fn handle_turn(&self, session: &SessionHandle, input: &str) -> Result<TurnOutcome> {
        let input = input.trim();
        if input.is_empty() {
            return Err(MindmateError::Validation(
                "Message cannot be empty".to_string(),
            ));
        }

        // Held for the whole turn: turns of one session never overlap.
        let mut ctx = session.lock().await;
        let session_id = ctx.id.clone();

        let mut mood = None;
        let mut suggestion = None;
        if self.settings.mood_tracking {
            mood = self.classifier.classify(input).await;
            if let Some(m) = mood {
                if let Err(error) = self.mood_log.append(&MoodSample::now(m)).await {
                    tracing::error!(session_id = %session_id, error = %error, "Failed to append mood sample");
                }

                suggestion = ctx.counter.record(m);
                if let Some(s) = &suggestion {
                    tracing::info!(session_id = %session_id, mood = %m, suggestion = %s.name, "Mood threshold reached");
                    ctx.pending_suggestion = Some(s.clone());
                }
            }
        }

        let crisis_keywords = detect_crisis_keywords(input);
        if !crisis_keywords.is_empty() {
            tracing::warn!(session_id = %session_id, keywords = ?crisis_keywords, "Crisis keywords detected");
            ctx.raise_crisis(&crisis_keywords);
        }

        let history = ctx.recent_turns(self.settings.history_window).to_vec();
        ctx.push_turn(Turn::user(input));

        let reply = match self
            .replies
            .generate(&self.settings.persona_prompt, &history, input, None)
            .await
        {
            Ok(reply) => reply.trim().to_string(),
            Err(error) => {
                tracing::error!(session_id = %session_id, error = %error, "Reply generation failed");
                FALLBACK_REPLY.to_string()
            }
        };
        ctx.push_turn(Turn::assistant(reply.clone()));

        let speech_job_id = match &self.speech {
            Some(queue) => Some(queue.enqueue(&reply).await),
            None => None,
        };

        Ok(TurnOutcome {
            reply,
            mood,
            suggestion,
            crisis_detected: !crisis_keywords.is_empty(),
            crisis_keywords,
            speech_job_id,
        })
    }
}
