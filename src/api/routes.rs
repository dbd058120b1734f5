use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use crate::jobs::ledger::StatusLedger;
use crate::store::{ArtifactStore, SessionStore};
use crate::synth::CloneService;

pub struct AppState {
    pub sessions: SessionStore,
    pub artifacts: ArtifactStore,
    pub ledger: StatusLedger,
    pub engine: CloneService,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .expose_headers([
            header::CONTENT_DISPOSITION,
            header::CONTENT_TYPE,
            header::CONTENT_LENGTH,
        ]);

    let api_routes = Router::new()
        .route("/sessions", post(handlers::upload_samples))
        .route("/jobs", post(handlers::generate_speech))
        .route("/jobs/:job_id", get(handlers::job_status))
        .route("/jobs/:job_id/artifact", get(handlers::job_audio))
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
