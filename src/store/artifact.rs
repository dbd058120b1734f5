use std::path::PathBuf;

use crate::error::AppError;

pub const ARTIFACT_CONTENT_TYPE: &str = "audio/wav";

/// Holds completed audio outputs, one WAV file per job.
pub struct ArtifactStore {
    outputs_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(outputs_dir: PathBuf) -> Self {
        Self { outputs_dir }
    }

    fn artifact_path(&self, job_id: &str) -> PathBuf {
        self.outputs_dir.join(format!("{}.wav", job_id))
    }

    /// Persist a completed job's audio. Written exactly once per job.
    pub async fn store(&self, job_id: &str, audio: &[u8]) -> Result<(), AppError> {
        let path = self.artifact_path(job_id);
        tokio::fs::write(&path, audio).await?;
        tracing::info!(
            "Stored artifact for job {} at {} ({} bytes)",
            job_id,
            path.display(),
            audio.len()
        );
        Ok(())
    }

    /// Fetch a completed job's audio. Empty files are treated as corrupt
    /// rather than served.
    pub async fn fetch(&self, job_id: &str) -> Result<Vec<u8>, AppError> {
        let path = self.artifact_path(job_id);
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|_| AppError::ArtifactNotFound(job_id.to_string()))?;

        if metadata.len() == 0 {
            return Err(AppError::EmptyArtifact(job_id.to_string()));
        }

        Ok(tokio::fs::read(&path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_and_fetches_audio() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().to_path_buf());

        store.store("job-1", &[7u8; 1000]).await.unwrap();
        let audio = store.fetch("job-1").await.unwrap();
        assert_eq!(audio.len(), 1000);
    }

    #[tokio::test]
    async fn missing_artifact_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().to_path_buf());

        let err = store.fetch("job-x").await.unwrap_err();
        assert!(matches!(err, AppError::ArtifactNotFound(_)));
    }

    #[tokio::test]
    async fn empty_artifact_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().to_path_buf());

        store.store("job-2", &[]).await.unwrap();
        let err = store.fetch("job-2").await.unwrap_err();
        assert!(matches!(err, AppError::EmptyArtifact(_)));
    }
}
