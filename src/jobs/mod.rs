pub mod ledger;
pub mod worker;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::routes::AppState;
use crate::error::AppError;

/// Job lifecycle states. `Completed` and `Error` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Training,
    Generating,
    Completed,
    Error,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Error)
    }
}

/// The durable lifecycle record for a job, persisted by the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRecord {
    pub status: JobStatus,
    pub progress: f32,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validate the request, write the initial ledger record, and schedule the
/// synthesis worker. Returns the job id without waiting for synthesis.
///
/// Known limitation: there is no durable work queue, so a crash between the
/// ledger write and the worker run leaves the job in `queued` forever.
pub async fn dispatch(
    state: Arc<AppState>,
    session_id: &str,
    text: &str,
    language: &str,
) -> Result<String, AppError> {
    if !state.sessions.session_exists(session_id).await {
        return Err(AppError::SessionNotFound(session_id.to_string()));
    }

    if text.trim().is_empty() {
        return Err(AppError::EmptyText);
    }

    let job_id = Uuid::new_v4().to_string();
    tracing::info!("Created job {} for session {}", job_id, session_id);

    state
        .ledger
        .put(&job_id, JobStatus::Queued, 0.0, Some("Job queued".to_string()))
        .await?;

    let job = job_id.clone();
    let session = session_id.to_string();
    let text = text.to_string();
    let language = language.to_string();
    tokio::spawn(async move {
        worker::run(state, &job, &session, &text, &language).await;
    });

    Ok(job_id)
}
