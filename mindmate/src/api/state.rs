use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::llm::{ChatBackend, LlmProvider};
use crate::mood::MoodClassifier;
use crate::services::{ChatPipeline, PipelineSettings, SessionStore};
use crate::speech::SpeechQueue;
use crate::store::MoodLog;
use crate::transcription::TranscriptionProvider;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: SessionStore,
    pub pipeline: ChatPipeline,
    pub mood_log: Arc<dyn MoodLog>,
    /// Reply model, kept for health reporting.
    pub llm: LlmProvider,
    pub transcription: TranscriptionProvider,
    pub speech: Option<SpeechQueue>,
}

impl AppState {
    pub fn new(
        config: Config,
        llm: LlmProvider,
        classifier_llm: LlmProvider,
        mood_log: Arc<dyn MoodLog>,
        transcription: TranscriptionProvider,
        speech: Option<SpeechQueue>,
    ) -> Self {
        let replies: Arc<dyn ChatBackend> = Arc::new(llm.clone());
        let classifier: Arc<dyn ChatBackend> = Arc::new(classifier_llm);
        Self::with_backends(config, llm, replies, classifier, mood_log, transcription, speech)
    }

    /// Like [`AppState::new`] with explicit generation backends.
    #[allow(clippy::too_many_arguments)]
    pub fn with_backends(
        config: Config,
        llm: LlmProvider,
        replies: Arc<dyn ChatBackend>,
        classifier: Arc<dyn ChatBackend>,
        mood_log: Arc<dyn MoodLog>,
        transcription: TranscriptionProvider,
        speech: Option<SpeechQueue>,
    ) -> Self {
        let config = Arc::new(config);
        let idle_timeout = (config.chat.session_idle_secs > 0)
            .then(|| Duration::from_secs(config.chat.session_idle_secs));
        let sessions = SessionStore::new(config.mood.threshold)
            .with_limits(idle_timeout, config.chat.max_sessions);

        let mut pipeline = ChatPipeline::new(
            replies,
            MoodClassifier::new(classifier),
            mood_log.clone(),
            PipelineSettings::from_config(&config),
        );
        if let Some(queue) = &speech {
            pipeline = pipeline.with_speech(queue.clone());
        }

        Self {
            config,
            sessions,
            pipeline,
            mood_log,
            llm,
            transcription,
            speech,
        }
    }
}
