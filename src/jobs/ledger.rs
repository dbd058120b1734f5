use std::path::PathBuf;

use chrono::Utc;

use crate::error::AppError;
use crate::jobs::{JobStatus, StatusRecord};

/// Disk-backed store of job status records, one JSON document per job.
///
/// Writes go to a temp file which is renamed over the target, so a reader
/// never observes a partially written record. A record survives process
/// restarts once `put` has returned.
pub struct StatusLedger {
    status_dir: PathBuf,
}

impl StatusLedger {
    pub fn new(status_dir: PathBuf) -> Self {
        Self { status_dir }
    }

    fn record_path(&self, job_id: &str) -> PathBuf {
        self.status_dir.join(format!("{}.json", job_id))
    }

    /// Create or update the record for `job_id`.
    ///
    /// `created_at` is preserved across updates and `updated_at` is refreshed
    /// on every write. Terminal records are left untouched.
    pub async fn put(
        &self,
        job_id: &str,
        status: JobStatus,
        progress: f32,
        message: Option<String>,
    ) -> Result<(), AppError> {
        let now = Utc::now();

        let record = match self.read_record(job_id).await? {
            Some(current) if current.status.is_terminal() => {
                tracing::warn!(
                    "Ignoring status update for terminal job {} ({:?} -> {:?})",
                    job_id,
                    current.status,
                    status
                );
                return Ok(());
            }
            Some(current) => StatusRecord {
                status,
                progress,
                message,
                created_at: current.created_at,
                updated_at: now,
            },
            None => StatusRecord {
                status,
                progress,
                message,
                created_at: now,
                updated_at: now,
            },
        };

        let json = serde_json::to_string(&record)
            .map_err(|e| AppError::LedgerError(job_id.to_string(), e.to_string()))?;

        // Atomic replace: readers see either the old record or the new one.
        let path = self.record_path(job_id);
        let tmp_path = self.status_dir.join(format!("{}.json.tmp", job_id));
        tokio::fs::write(&tmp_path, &json)
            .await
            .map_err(|e| AppError::LedgerError(job_id.to_string(), e.to_string()))?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| AppError::LedgerError(job_id.to_string(), e.to_string()))?;

        tracing::info!("Saved status for job {}: {:?}", job_id, status);
        Ok(())
    }

    pub async fn get(&self, job_id: &str) -> Result<StatusRecord, AppError> {
        self.read_record(job_id)
            .await?
            .ok_or_else(|| AppError::JobNotFound(job_id.to_string()))
    }

    async fn read_record(&self, job_id: &str) -> Result<Option<StatusRecord>, AppError> {
        let path = self.record_path(job_id);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AppError::LedgerError(job_id.to_string(), e.to_string())),
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| AppError::LedgerError(job_id.to_string(), e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger(dir: &tempfile::TempDir) -> StatusLedger {
        StatusLedger::new(dir.path().to_path_buf())
    }

    #[tokio::test]
    async fn creates_record_with_matching_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger(&dir);

        ledger
            .put("j1", JobStatus::Queued, 0.0, Some("Job queued".to_string()))
            .await
            .unwrap();

        let record = ledger.get("j1").await.unwrap();
        assert_eq!(record.status, JobStatus::Queued);
        assert_eq!(record.progress, 0.0);
        assert_eq!(record.created_at, record.updated_at);
    }

    #[tokio::test]
    async fn update_preserves_created_at_and_advances_updated_at() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger(&dir);

        ledger.put("j1", JobStatus::Queued, 0.0, None).await.unwrap();
        let first = ledger.get("j1").await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        ledger
            .put("j1", JobStatus::Generating, 30.0, Some("Generating speech...".to_string()))
            .await
            .unwrap();
        let second = ledger.get("j1").await.unwrap();

        assert_eq!(second.status, JobStatus::Generating);
        assert_eq!(second.progress, 30.0);
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at > first.updated_at);
    }

    #[tokio::test]
    async fn terminal_records_are_never_mutated() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger(&dir);

        ledger
            .put("j1", JobStatus::Completed, 100.0, None)
            .await
            .unwrap();
        ledger
            .put("j1", JobStatus::Training, 0.0, Some("late".to_string()))
            .await
            .unwrap();

        let record = ledger.get("j1").await.unwrap();
        assert_eq!(record.status, JobStatus::Completed);
        assert_eq!(record.progress, 100.0);
    }

    #[tokio::test]
    async fn missing_job_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger(&dir);

        let err = ledger.get("nope").await.unwrap_err();
        assert!(matches!(err, AppError::JobNotFound(_)));
    }

    #[tokio::test]
    async fn status_serializes_as_lowercase_string() {
        let json = serde_json::to_string(&JobStatus::Generating).unwrap();
        assert_eq!(json, "\"generating\"");
    }
}
