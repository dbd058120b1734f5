use std::sync::Arc;

use crate::api::routes::AppState;
use crate::error::AppError;
use crate::jobs::JobStatus;

/// Drive one job through `queued -> training -> generating -> completed`,
/// recording failures as a terminal `error` state instead of propagating.
pub async fn run(state: Arc<AppState>, job_id: &str, session_id: &str, text: &str, language: &str) {
    if let Err(e) = process(&state, job_id, session_id, text, language).await {
        tracing::error!("Error in voice cloning for job {}: {}", job_id, e);
        if let Err(put_err) = state
            .ledger
            .put(job_id, JobStatus::Error, 0.0, Some(e.to_string()))
            .await
        {
            tracing::error!("Failed to record error for job {}: {}", job_id, put_err);
        }
    }
}

async fn process(
    state: &AppState,
    job_id: &str,
    session_id: &str,
    text: &str,
    language: &str,
) -> Result<(), AppError> {
    tracing::info!("Starting voice cloning for job {}", job_id);
    state
        .ledger
        .put(
            job_id,
            JobStatus::Training,
            0.0,
            Some("Preparing voice samples...".to_string()),
        )
        .await?;

    let samples = state.sessions.list_reference_files(session_id).await?;
    let reference = samples
        .first()
        .cloned()
        .ok_or_else(|| AppError::SynthesisError("No voice samples found".to_string()))?;

    tracing::info!(
        "Found {} voice samples, using reference file: {}",
        samples.len(),
        reference.display()
    );

    state
        .ledger
        .put(
            job_id,
            JobStatus::Generating,
            30.0,
            Some("Generating speech...".to_string()),
        )
        .await?;

    let audio = state.engine.synthesize(text, &reference, language).await?;
    if audio.is_empty() {
        return Err(AppError::EmptyArtifact(job_id.to_string()));
    }

    state.artifacts.store(job_id, &audio).await?;
    state
        .ledger
        .put(
            job_id,
            JobStatus::Completed,
            100.0,
            Some("Voice generation complete!".to_string()),
        )
        .await?;

    Ok(())
}
