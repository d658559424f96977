mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use common::{init_test_logger, ScriptedBackend};
use mindmate::llm::prompts::FALLBACK_REPLY;
use mindmate::llm::ChatBackend;
use mindmate::models::Mood;
use mindmate::mood::MoodClassifier;
use mindmate::services::{ChatPipeline, PipelineSettings, SessionStore};
use mindmate::store::{CsvMoodLog, MoodLog};

fn pipeline(backend: Arc<ScriptedBackend>, log: Arc<CsvMoodLog>) -> ChatPipeline {
    let replies: Arc<dyn ChatBackend> = backend.clone();
    let classifier: Arc<dyn ChatBackend> = backend;
    ChatPipeline::new(
        replies,
        MoodClassifier::new(classifier),
        log,
        PipelineSettings::default(),
    )
}

#[tokio::test]
async fn third_sad_turn_emits_suggestion_and_resets() {
    init_test_logger();
    let dir = TempDir::new().unwrap();
    let log = Arc::new(CsvMoodLog::new(dir.path().join("mood_log.csv")));
    let backend = Arc::new(ScriptedBackend::new(&["😔", "😔", "😔"]));
    let pipeline = pipeline(backend, log.clone());

    let store = SessionStore::new(3);
    let session = store.create().await;

    let first = pipeline.handle_turn(&session, "I feel low").await.unwrap();
    let second = pipeline.handle_turn(&session, "still low").await.unwrap();
    assert!(first.suggestion.is_none());
    assert!(second.suggestion.is_none());

    let third = pipeline.handle_turn(&session, "nothing helps").await.unwrap();
    let suggestion = third.suggestion.expect("suggestion on third sad turn");
    assert_eq!(suggestion.mood, Mood::Sad);
    assert_eq!(suggestion.name, "PHQ-9 Depression Screening");

    let ctx = session.lock().await;
    assert_eq!(ctx.counter.count(Mood::Sad), 0);
    assert_eq!(log.load_all().await.unwrap().len(), 3);
}

#[tokio::test]
async fn unclassifiable_turn_still_replies_without_logging() {
    init_test_logger();
    let dir = TempDir::new().unwrap();
    let log = Arc::new(CsvMoodLog::new(dir.path().join("mood_log.csv")));
    let backend = Arc::new(ScriptedBackend::new(&["I cannot tell"]));
    let pipeline = pipeline(backend, log.clone());

    let store = SessionStore::new(3);
    let session = store.create().await;

    let outcome = pipeline.handle_turn(&session, "hmm").await.unwrap();

    assert_eq!(outcome.mood, None);
    assert_eq!(outcome.reply, "reply 1: hmm");
    assert!(log.load_all().await.unwrap().is_empty());

    let ctx = session.lock().await;
    assert!(ctx.counter.counts().iter().all(|(_, count)| *count == 0));
}

#[tokio::test]
async fn failed_log_append_does_not_break_the_turn() {
    init_test_logger();
    let dir = TempDir::new().unwrap();
    let log = Arc::new(CsvMoodLog::new(
        dir.path().join("missing").join("mood_log.csv"),
    ));
    let backend = Arc::new(ScriptedBackend::new(&["😊"]));
    let pipeline = pipeline(backend, log.clone());

    let store = SessionStore::new(3);
    let session = store.create().await;

    let outcome = pipeline.handle_turn(&session, "great day").await.unwrap();

    assert_eq!(outcome.mood, Some(Mood::Happy));
    assert_eq!(outcome.reply, "reply 1: great day");
    let ctx = session.lock().await;
    assert_eq!(ctx.counter.count(Mood::Happy), 1);
}

#[tokio::test]
async fn failed_reply_falls_back_to_canned_message() {
    init_test_logger();
    let dir = TempDir::new().unwrap();
    let log = Arc::new(CsvMoodLog::new(dir.path().join("mood_log.csv")));
    let backend = Arc::new(ScriptedBackend::new(&["😐"]).failing_replies());
    let pipeline = pipeline(backend, log);

    let store = SessionStore::new(3);
    let session = store.create().await;

    let outcome = pipeline.handle_turn(&session, "ok I guess").await.unwrap();

    assert_eq!(outcome.reply, FALLBACK_REPLY);
    assert_eq!(outcome.mood, Some(Mood::Neutral));
    assert_eq!(session.lock().await.turns.len(), 2);
}

#[tokio::test]
async fn sessions_do_not_share_history() {
    init_test_logger();
    let dir = TempDir::new().unwrap();
    let log = Arc::new(CsvMoodLog::new(dir.path().join("mood_log.csv")));
    let backend = Arc::new(ScriptedBackend::new(&[]));
    let pipeline = pipeline(backend.clone(), log);

    let store = SessionStore::new(3);
    let a = store.create().await;
    let b = store.create().await;

    pipeline.handle_turn(&a, "hello from a").await.unwrap();
    pipeline.handle_turn(&b, "hello from b").await.unwrap();

    let histories = backend.reply_histories.lock().unwrap();
    assert!(histories[0].is_empty());
    assert!(histories[1].is_empty());
}
