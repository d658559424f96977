mod common;

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{init_test_logger, ScriptedBackend};
use mindmate::api::{create_router, AppState};
use mindmate::config::{
    ChatConfig, Config, MoodConfig, ServerConfig, SpeechConfig, TranscriptionConfig,
};
use mindmate::llm::{ChatBackend, LlmProvider};
use mindmate::store::CsvMoodLog;
use mindmate::transcription::TranscriptionProvider;

const API_KEY: &str = "integration-key";

fn config(dir: &Path, transcription: TranscriptionConfig) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            api_keys: vec![API_KEY.to_string()],
        },
        llm: None,
        mood: MoodConfig {
            enabled: true,
            threshold: 2,
            log_path: dir.join("mood_log.csv").to_string_lossy().into_owned(),
            model: None,
        },
        chat: ChatConfig {
            history_window: 4,
            ..ChatConfig::default()
        },
        transcription,
        speech: SpeechConfig::default(),
    }
}

fn app_with(dir: &Path, moods: &[&str], transcription: TranscriptionConfig) -> Router {
    init_test_logger();
    let config = config(dir, transcription);
    let backend: Arc<dyn ChatBackend> = Arc::new(ScriptedBackend::new(moods));
    let mood_log = Arc::new(CsvMoodLog::new(&config.mood.log_path));
    let transcription = TranscriptionProvider::new(&config.transcription);

    let state = AppState::with_backends(
        config,
        LlmProvider::new(None),
        backend.clone(),
        backend,
        mood_log,
        transcription,
        None,
    );
    create_router(state)
}

fn app(dir: &Path, moods: &[&str]) -> Router {
    app_with(dir, moods, TranscriptionConfig::default())
}

fn request(method: &str, uri: &str, body: Option<serde_json::Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", format!("Bearer {API_KEY}"));
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn session_lifecycle() {
    let dir = TempDir::new().unwrap();
    let app = app(dir.path(), &["😠", "😠"]);

    let (status, json) = send(&app, request("POST", "/api/v1/sessions", None)).await;
    assert_eq!(status, StatusCode::CREATED);
    let session_id = json["data"]["sessionId"].as_str().unwrap().to_string();

    let uri = format!("/api/v1/sessions/{session_id}/messages");
    let (status, first) = send(
        &app,
        request("POST", &uri, Some(serde_json::json!({ "message": "so annoyed" }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["data"]["mood"], "angry");
    assert!(first["data"].get("suggestion").is_none());

    let (_, second) = send(
        &app,
        request("POST", &uri, Some(serde_json::json!({ "message": "still annoyed" }))),
    )
    .await;
    assert_eq!(second["data"]["suggestion"]["mood"], "angry");
    assert!(second["data"]["suggestion"]["disclaimer"].is_string());

    let (status, snapshot) = send(
        &app,
        request("GET", &format!("/api/v1/sessions/{session_id}"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot["data"]["turns"].as_array().unwrap().len(), 4);
    assert_eq!(snapshot["data"]["turns"][0]["role"], "user");
    assert_eq!(snapshot["data"]["pendingSuggestion"]["mood"], "angry");

    let (status, deleted) = send(
        &app,
        request("DELETE", &format!("/api/v1/sessions/{session_id}"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["data"]["deleted"], true);

    let (status, _) = send(
        &app,
        request("GET", &format!("/api/v1/sessions/{session_id}"), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn crisis_language_is_flagged() {
    let dir = TempDir::new().unwrap();
    let app = app(dir.path(), &["😥"]);

    let (status, json) = send(
        &app,
        request(
            "POST",
            "/api/v1/sessions/night-shift/messages",
            Some(serde_json::json!({ "message": "I want to end my life" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["crisisDetected"], true);
    assert!(!json["data"]["crisisKeywords"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn invalid_session_id_is_rejected() {
    let dir = TempDir::new().unwrap();
    let app = app(dir.path(), &[]);

    let (status, json) = send(
        &app,
        request(
            "POST",
            "/api/v1/sessions/bad%20id/messages",
            Some(serde_json::json!({ "message": "hi" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "invalid_request");
}

#[tokio::test]
async fn malformed_json_uses_error_envelope() {
    let dir = TempDir::new().unwrap();
    let app = app(dir.path(), &[]);

    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/sessions/abc/messages")
        .header("Authorization", format!("Bearer {API_KEY}"))
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, json) = send(&app, req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"]["message"].is_string());
}

#[tokio::test]
async fn manual_mood_tracking_and_chart() {
    let dir = TempDir::new().unwrap();
    let app = app(dir.path(), &[]);

    let (status, created) = send(
        &app,
        request("POST", "/api/v1/moods", Some(serde_json::json!({ "mood": "happy" }))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"]["emoji"], "😊");

    let (status, _) = send(
        &app,
        request("POST", "/api/v1/moods", Some(serde_json::json!({ "mood": "😔" }))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = send(
        &app,
        request("POST", "/api/v1/moods", Some(serde_json::json!({ "mood": "bored" }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "invalid_request");

    let (_, listed) = send(&app, request("GET", "/api/v1/moods", None)).await;
    assert_eq!(listed["meta"]["total"], 2);

    let (status, chart) = send(&app, request("GET", "/api/v1/moods/chart", None)).await;
    assert_eq!(status, StatusCode::OK);
    let scores: Vec<f64> = chart["data"]["points"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["score"].as_f64().unwrap())
        .collect();
    assert_eq!(scores, vec![2.0, -1.0]);
}

#[tokio::test]
async fn empty_journal_charts_as_empty_series() {
    let dir = TempDir::new().unwrap();
    let app = app(dir.path(), &[]);

    let (status, chart) = send(&app, request("GET", "/api/v1/moods/chart", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(chart["data"]["points"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn voice_message_is_transcribed_then_answered() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "text": "exam kal hai" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let transcription = TranscriptionConfig {
        model: "openai/whisper-1".to_string(),
        api_key: Some("test-key".to_string()),
        base_url: Some(server.uri()),
        timeout_secs: 10,
        max_file_size: 1024 * 1024,
    };
    let app = app_with(dir.path(), &["😥"], transcription);

    let boundary = "mindmate-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"audio\"; filename=\"note.webm\"\r\n\
         Content-Type: audio/webm\r\n\r\n\
         fake-audio\r\n\
         --{boundary}--\r\n"
    );
    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/sessions/voice-user/voice")
        .header("Authorization", format!("Bearer {API_KEY}"))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let (status, json) = send(&app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["transcript"], "exam kal hai");
    assert_eq!(json["data"]["reply"], "reply 1: exam kal hai");
    assert_eq!(json["data"]["mood"], "distressed");
}

#[tokio::test]
async fn voice_message_without_transcription_is_not_implemented() {
    let dir = TempDir::new().unwrap();
    let transcription = TranscriptionConfig {
        api_key: None,
        base_url: None,
        ..TranscriptionConfig::default()
    };
    let app = app_with(dir.path(), &[], transcription);

    let boundary = "b";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"audio\"; filename=\"a.mp3\"\r\n\r\n\
         abc\r\n\
         --{boundary}--\r\n"
    );
    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/sessions/s1/voice")
        .header("Authorization", format!("Bearer {API_KEY}"))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let (status, json) = send(&app, req).await;

    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(json["error"]["code"], "not_implemented");
}

#[tokio::test]
async fn voice_message_with_broken_multipart_reports_parse_error() {
    let dir = TempDir::new().unwrap();
    let app = app(dir.path(), &[]);

    // Declares a boundary that never appears in the body.
    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/sessions/s1/voice")
        .header("Authorization", format!("Bearer {API_KEY}"))
        .header("content-type", "multipart/form-data; boundary=b")
        .body(Body::from("this is not a multipart body"))
        .unwrap();

    let (status, json) = send(&app, req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "invalid_request");
    let message = json["error"]["message"].as_str().unwrap();
    assert!(message.starts_with("Invalid multipart body"), "{message}");
}

#[tokio::test]
async fn wrong_key_is_unauthorized() {
    let dir = TempDir::new().unwrap();
    let app = app(dir.path(), &[]);

    let req = Request::builder()
        .uri("/api/v1/moods")
        .header("Authorization", "Bearer nope")
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(&app, req).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"]["code"], "unauthorized");
}
