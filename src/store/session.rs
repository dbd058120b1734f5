use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::AppError;

/// Result of a successful sample upload.
#[derive(Debug)]
pub struct SavedSession {
    pub session_id: String,
    pub saved_files: Vec<String>,
}

/// Stores uploaded reference-audio samples, one directory per session.
pub struct SessionStore {
    uploads_dir: PathBuf,
}

impl SessionStore {
    pub fn new(uploads_dir: PathBuf) -> Self {
        Self { uploads_dir }
    }

    fn session_dir(&self, session_id: &str) -> PathBuf {
        self.uploads_dir.join(session_id)
    }

    /// Save a batch of uploaded files under a fresh session id.
    ///
    /// Entries without a usable filename are skipped. A write failure aborts
    /// the whole batch and reports the offending filename.
    pub async fn create_session(
        &self,
        files: Vec<(String, Vec<u8>)>,
    ) -> Result<SavedSession, AppError> {
        let session_id = Uuid::new_v4().to_string();
        let session_dir = self.session_dir(&session_id);
        tokio::fs::create_dir_all(&session_dir).await?;

        tracing::info!("Created session directory: {}", session_dir.display());

        let mut saved_files = Vec::new();
        for (i, (name, content)) in files.iter().enumerate() {
            // Strip any directory components so uploads cannot escape the
            // session directory.
            let safe_name = match Path::new(name).file_name() {
                Some(n) if !n.is_empty() => n.to_string_lossy().to_string(),
                _ => {
                    tracing::warn!("File {} has no filename, skipping", i + 1);
                    continue;
                }
            };

            let file_path = session_dir.join(&safe_name);
            tokio::fs::write(&file_path, content)
                .await
                .map_err(|e| AppError::PartialWrite(safe_name.clone(), e.to_string()))?;

            tracing::info!(
                "Saved {} bytes to {}",
                content.len(),
                file_path.display()
            );
            saved_files.push(file_path.to_string_lossy().to_string());
        }

        if saved_files.is_empty() {
            return Err(AppError::NoFilesSaved);
        }

        tracing::info!("Successfully saved {} files", saved_files.len());
        Ok(SavedSession {
            session_id,
            saved_files,
        })
    }

    pub async fn session_exists(&self, session_id: &str) -> bool {
        tokio::fs::metadata(self.session_dir(session_id))
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    /// List the session's sample files, sorted lexicographically by filename
    /// so the choice of reference sample is reproducible across calls.
    pub async fn list_reference_files(&self, session_id: &str) -> Result<Vec<PathBuf>, AppError> {
        let session_dir = self.session_dir(session_id);
        let mut entries = tokio::fs::read_dir(&session_dir)
            .await
            .map_err(|_| AppError::SessionNotFound(session_id.to_string()))?;

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();

        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &tempfile::TempDir) -> SessionStore {
        SessionStore::new(dir.path().to_path_buf())
    }

    #[tokio::test]
    async fn saves_files_and_lists_them_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        let saved = store
            .create_session(vec![
                ("b.wav".to_string(), vec![2u8; 10]),
                ("a.wav".to_string(), vec![1u8; 10]),
            ])
            .await
            .unwrap();
        assert_eq!(saved.saved_files.len(), 2);

        let files = store.list_reference_files(&saved.session_id).await.unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].file_name().unwrap(), "a.wav");
        assert_eq!(files[1].file_name().unwrap(), "b.wav");
    }

    #[tokio::test]
    async fn strips_directory_components_from_filenames() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        let saved = store
            .create_session(vec![("../../etc/passwd.wav".to_string(), vec![0u8; 4])])
            .await
            .unwrap();

        let files = store.list_reference_files(&saved.session_id).await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name().unwrap(), "passwd.wav");
        assert!(files[0].starts_with(dir.path()));
    }

    #[tokio::test]
    async fn rejects_batch_with_only_empty_filenames() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        let err = store
            .create_session(vec![(String::new(), vec![0u8; 4])])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NoFilesSaved));
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        assert!(!store.session_exists("missing").await);
        let err = store.list_reference_files("missing").await.unwrap_err();
        assert!(matches!(err, AppError::SessionNotFound(_)));
    }
}
