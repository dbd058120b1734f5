use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use voice_clone_server::api::routes::{create_router, AppState};
use voice_clone_server::jobs::ledger::StatusLedger;
use voice_clone_server::store::{ArtifactStore, SessionStore};
use voice_clone_server::synth::{CloneService, CommandSynthesizer, Synthesizer, ToneSynthesizer};

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
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "8000".to_string())
        .parse()
        .expect("PORT must be a number");
    let data_dir = PathBuf::from(std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string()));

    let uploads_dir = data_dir.join("uploads");
    let outputs_dir = data_dir.join("outputs");
    let status_dir = data_dir.join("status");
    for dir in [&uploads_dir, &outputs_dir, &status_dir] {
        std::fs::create_dir_all(dir).expect("Failed to create data directory");
    }

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("Invalid address");

    tracing::info!("Voice Clone Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Starting server on http://{}", addr);
    tracing::info!("Data directory: {}", data_dir.display());

    // Pick the synthesis backend
    let synthesizer: Arc<dyn Synthesizer> = match std::env::var("SYNTH_CMD") {
        Ok(cmd) => {
            tracing::info!("Using external synthesizer: {}", cmd);
            Arc::new(CommandSynthesizer::new(cmd))
        }
        Err(_) => {
            tracing::warn!("SYNTH_CMD not set, using built-in tone synthesizer");
            Arc::new(ToneSynthesizer::new())
        }
    };

    let state = Arc::new(AppState {
        sessions: SessionStore::new(uploads_dir),
        artifacts: ArtifactStore::new(outputs_dir),
        ledger: StatusLedger::new(status_dir),
        engine: CloneService::new(synthesizer),
    });

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
