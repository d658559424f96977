use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mindmate::api::{create_router, AppState};
use mindmate::config::Config;
use mindmate::llm::LlmProvider;
use mindmate::speech::{SpeechProvider, SpeechQueue};
use mindmate::store::CsvMoodLog;
use mindmate::transcription::TranscriptionProvider;

#[derive(Parser)]
#[command(name = "mindmate")]
#[command(about = "Mood-aware wellbeing companion for students")]
struct Args {
    /// Override the listen port from the environment
    #[arg(long)]
    port: Option<u16>,

    /// Override the mood log path from the environment
    #[arg(long)]
    mood_log: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mindmate=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::from_env();
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(path) = args.mood_log {
        config.mood.log_path = path;
    }

    if config.server.api_keys.is_empty() {
        tracing::warn!(
            "MINDMATE_API_KEYS is not set. Session and mood endpoints will reject every request."
        );
    }

    if let Some(llm_config) = &config.llm {
        tracing::info!("Initializing LLM provider: {}...", llm_config.model);
    }
    let llm = LlmProvider::new(config.llm.as_ref());
    if !llm.is_available() {
        tracing::warn!("LLM unavailable - replies will fall back to a canned message");
    }

    let classifier_config = config.classifier_llm();
    let classifier_llm = LlmProvider::new(classifier_config.as_ref());
    if config.mood.enabled && !classifier_llm.is_available() {
        tracing::warn!("Mood classifier unavailable - turns will not be mood tagged");
    }

    tracing::info!("Mood log: {}", config.mood.log_path);
    let mood_log = Arc::new(CsvMoodLog::new(&config.mood.log_path));

    tracing::info!(
        "Initializing transcription provider: {}...",
        config.transcription.model
    );
    let transcription = TranscriptionProvider::new(&config.transcription);
    if !transcription.is_available() {
        tracing::warn!("Transcription unavailable - voice input is disabled");
    }

    let cancel_token = CancellationToken::new();

    let mut speech_worker = None;
    let speech = if config.speech.enabled {
        tracing::info!("Starting speech worker: {}...", config.speech.model);
        let provider = SpeechProvider::new(&config.speech);
        if !provider.is_available() {
            tracing::warn!("Speech provider unavailable - speech jobs will fail");
        }
        let (queue, worker) = SpeechQueue::start(
            provider,
            &config.speech.output_dir,
            config.speech.queue_capacity,
            config.speech.max_jobs,
            cancel_token.child_token(),
        );
        speech_worker = Some(worker);
        Some(queue)
    } else {
        None
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState::new(
        config,
        llm,
        classifier_llm,
        mood_log,
        transcription,
        speech,
    );

    if state.config.chat.session_idle_secs > 0 {
        let sessions = state.sessions.clone();
        let interval = Duration::from_secs(state.config.chat.session_idle_secs.clamp(1, 60));
        let token = cancel_token.child_token();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        tracing::info!("Session sweeper shutting down...");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {
                        let removed = sessions.prune_idle().await;
                        if removed > 0 {
                            tracing::info!("Expired {} idle sessions", removed);
                        }
                    }
                }
            }
        });
    }

    let app = create_router(state);

    tracing::info!("MindMate starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/api/v1/health", addr);
    tracing::info!("  API docs:     http://{}/api/v1/docs", addr);
    tracing::info!("  OpenAPI spec: http://{}/api/v1/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token))
        .await?;

    if let Some(worker) = speech_worker {
        tracing::info!("Waiting for the speech worker to finish its current job...");
        if let Err(e) = worker.await {
            tracing::error!("Speech worker ended abnormally: {}", e);
        }
    }

    Ok(())
}

async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping speech worker...");
    cancel_token.cancel();
}
