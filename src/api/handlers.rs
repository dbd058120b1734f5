use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use super::{GenerateRequest, HealthResponse, JobResponse, UploadResponse};
use crate::api::routes::AppState;
use crate::error::AppError;
use crate::jobs;
use crate::jobs::StatusRecord;
use crate::store::artifact::ARTIFACT_CONTENT_TYPE;

pub async fn upload_samples(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.file_name().map(|n| n.to_string()).unwrap_or_default();
        let content = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read file {}: {}", name, e)))?;
        files.push((name, content.to_vec()));
    }

    tracing::info!("Received upload request with {} files", files.len());

    let saved = state.sessions.create_session(files).await?;
    Ok(Json(UploadResponse {
        message: format!("Successfully uploaded {} files", saved.saved_files.len()),
        session_id: saved.session_id,
        saved_files: saved.saved_files,
    }))
}

pub async fn generate_speech(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<JobResponse>, AppError> {
    tracing::info!(
        "Received speech generation request for session {}",
        request.session_id
    );

    let job_id = jobs::dispatch(state, &request.session_id, &request.text, &request.language).await?;
    Ok(Json(JobResponse { job_id }))
}

pub async fn job_status(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Json<StatusRecord>, AppError> {
    let record = state.ledger.get(&job_id).await?;
    Ok(Json(record))
}

pub async fn job_audio(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Response, AppError> {
    let audio = state.artifacts.fetch(&job_id).await?;

    tracing::info!("Serving audio for job {} ({} bytes)", job_id, audio.len());

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, ARTIFACT_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"generated_speech_{}.wav\"", job_id),
            ),
            (header::CONTENT_LENGTH, audio.len().to_string()),
            (header::ACCEPT_RANGES, "bytes".to_string()),
        ],
        audio,
    )
        .into_response())
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
