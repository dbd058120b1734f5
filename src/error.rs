use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Audio file not found for job {0}")]
    ArtifactNotFound(String),

    #[error("Generated audio file is empty for job {0}")]
    EmptyArtifact(String),

    #[error("Text input cannot be empty")]
    EmptyText,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("No files were successfully saved")]
    NoFilesSaved,

    #[error("Error processing file {0}: {1}")]
    PartialWrite(String, String),

    #[error("Ledger error for job {0}: {1}")]
    LedgerError(String, String),

    #[error("Synthesis failed: {0}")]
    SynthesisError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "SESSION_NOT_FOUND"),
            AppError::JobNotFound(_) => (StatusCode::NOT_FOUND, "JOB_NOT_FOUND"),
            AppError::ArtifactNotFound(_) => (StatusCode::NOT_FOUND, "ARTIFACT_NOT_FOUND"),
            AppError::EmptyArtifact(_) => (StatusCode::INTERNAL_SERVER_ERROR, "EMPTY_ARTIFACT"),
            AppError::EmptyText => (StatusCode::BAD_REQUEST, "EMPTY_TEXT"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::NoFilesSaved => (StatusCode::BAD_REQUEST, "NO_FILES_SAVED"),
            AppError::PartialWrite(_, _) => (StatusCode::INTERNAL_SERVER_ERROR, "UPLOAD_ERROR"),
            AppError::LedgerError(_, _) => (StatusCode::INTERNAL_SERVER_ERROR, "LEDGER_ERROR"),
            AppError::SynthesisError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SYNTHESIS_ERROR"),
            AppError::IoError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
            AppError::JsonError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "JSON_ERROR"),
        };

        let message = self.to_string();
        tracing::error!("Request failed: {} - {}", code, message);

        (
            status,
            Json(ErrorResponse {
                error: message,
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}
