use std::sync::Arc;

use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod error;
mod tts;

use api::routes::{create_router, AppState};
use config::Config;
use tts::{EdgeTtsEngine, TtsService, VoiceMapping};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Configuration from environment
    let config = Config::from_env().expect("Invalid configuration");
    let addr = config.addr().expect("Invalid address");

    tracing::info!("Speech Proxy v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Starting server on http://{}", addr);
    tracing::info!(
        engine = %config.edge_tts_bin,
        timeout_secs = config.synthesis_timeout.as_secs(),
        max_text_chars = config.max_text_chars,
        policy = ?config.unknown_voice_policy,
        api_keys = config.api_keys.len(),
        "Synthesis settings"
    );
    if config.api_keys.is_empty() {
        tracing::warn!("API_KEYS not set, speak endpoints are open");
    }

    // Create TTS service; the voice table is fixed for the life of the process
    let engine = Arc::new(EdgeTtsEngine::new(&config.edge_tts_bin));
    let tts = TtsService::new(
        engine,
        VoiceMapping::standard(),
        config.unknown_voice_policy,
        config.max_text_chars,
        config.synthesis_timeout,
    );

    // Create app state
    let state = Arc::new(AppState {
        tts,
        api_keys: config.api_keys,
    });

    // Create router
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
