//! Upload side of a backup run: make sure the destination folder exists,
//! then put each file through the store's two-step upload.

use thiserror::Error;

use crate::disk::{DiskError, FolderStatus, RemoteStore};

/// Failure uploading one file. Each variant names the step that failed.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Could not get an upload link for {path}: {source}")]
    TargetRequest { path: String, source: DiskError },

    #[error("No upload link returned for {path}")]
    NoUploadTarget { path: String },

    #[error("Upload of {path} failed: {source}")]
    Push { path: String, source: DiskError },
}

/// Remote path of `file_name` inside `folder`.
pub fn remote_path(folder: &str, file_name: &str) -> String {
    format!("{}/{}", folder.trim_end_matches('/'), file_name)
}

/// Result of one upload attempt.
#[derive(Debug)]
pub struct TransferOutcome {
    pub file_name: String,
    pub source_url: String,
    pub result: Result<(), UploadError>,
}

impl TransferOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Realizes "folder + file" destinations on a [`RemoteStore`].
pub struct TransferSink<'a> {
    store: &'a dyn RemoteStore,
    folder: String,
}

impl<'a> TransferSink<'a> {
    pub fn new(store: &'a dyn RemoteStore, folder: impl Into<String>) -> Self {
        Self {
            store,
            folder: folder.into(),
        }
    }

    pub fn remote_path(&self, file_name: &str) -> String {
        remote_path(&self.folder, file_name)
    }

    /// Create the destination folder. An existing folder counts as success.
    pub async fn ensure_container(&self) -> Result<FolderStatus, DiskError> {
        let status = self.store.create_folder(&self.folder).await?;
        match status {
            FolderStatus::Created => tracing::info!("Created folder \"{}\"", self.folder),
            FolderStatus::AlreadyExists => {
                tracing::info!("Folder \"{}\" already exists", self.folder)
            }
        }
        Ok(status)
    }

    /// Upload `bytes` to `path`, replacing any existing file.
    ///
    /// Step two is never attempted when step one yields no write target.
    pub async fn put_file(&self, path: &str, bytes: Vec<u8>) -> Result<(), UploadError> {
        let target = self
            .store
            .request_upload_target(path, true)
            .await
            .map_err(|source| UploadError::TargetRequest {
                path: path.to_string(),
                source,
            })?
            .ok_or_else(|| UploadError::NoUploadTarget {
                path: path.to_string(),
            })?;

        self.store
            .push_bytes(&target, bytes)
            .await
            .map_err(|source| UploadError::Push {
                path: path.to_string(),
                source,
            })?;

        tracing::debug!("Uploaded {}", path);
        Ok(())
    }

    /// Upload one photo's bytes under `file_name` and report the outcome.
    pub async fn transfer(
        &self,
        file_name: String,
        source_url: String,
        bytes: Vec<u8>,
    ) -> TransferOutcome {
        let path = self.remote_path(&file_name);
        let result = self.put_file(&path, bytes).await;
        TransferOutcome {
            file_name,
            source_url,
            result,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::MemoryStore;
    use super::*;

    #[tokio::test]
    async fn test_ensure_container_twice_is_idempotent() {
        let store = MemoryStore::new();
        let sink = TransferSink::new(&store, "vk_photos");

        assert_eq!(sink.ensure_container().await.unwrap(), FolderStatus::Created);
        assert_eq!(
            sink.ensure_container().await.unwrap(),
            FolderStatus::AlreadyExists
        );
        assert_eq!(store.folders.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ensure_container_failure() {
        let store = MemoryStore {
            fail_create: Some(401),
            ..Default::default()
        };
        let sink = TransferSink::new(&store, "vk_photos");
        let err = sink.ensure_container().await.unwrap_err();
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn test_remote_path() {
        let store = MemoryStore::new();
        assert_eq!(
            TransferSink::new(&store, "vk_photos").remote_path("5.jpg"),
            "vk_photos/5.jpg"
        );
        assert_eq!(
            TransferSink::new(&store, "vk_photos/").remote_path("5.jpg"),
            "vk_photos/5.jpg"
        );
    }

    #[tokio::test]
    async fn test_put_file_writes_one_object() {
        let store = MemoryStore::new();
        let sink = TransferSink::new(&store, "vk_photos");
        sink.put_file("vk_photos/1.jpg", b"jpeg".to_vec()).await.unwrap();
        assert_eq!(store.file("vk_photos/1.jpg").unwrap(), b"jpeg");
        assert_eq!(store.files.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_put_file_overwrites() {
        let store = MemoryStore::new();
        let sink = TransferSink::new(&store, "vk_photos");
        sink.put_file("vk_photos/1.jpg", b"old".to_vec()).await.unwrap();
        sink.put_file("vk_photos/1.jpg", b"new".to_vec()).await.unwrap();
        assert_eq!(store.file("vk_photos/1.jpg").unwrap(), b"new");
        assert_eq!(store.files.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_no_target_skips_push() {
        let mut store = MemoryStore::new();
        store.no_target_for.insert("vk_photos/1.jpg".into());
        let sink = TransferSink::new(&store, "vk_photos");

        let err = sink.put_file("vk_photos/1.jpg", b"x".to_vec()).await.unwrap_err();
        assert!(matches!(err, UploadError::NoUploadTarget { .. }));
        assert_eq!(store.push_count(), 0);
    }

    #[tokio::test]
    async fn test_target_request_failure_skips_push() {
        let mut store = MemoryStore::new();
        store.refuse_target_for.insert("vk_photos/1.jpg".into());
        let sink = TransferSink::new(&store, "vk_photos");

        let err = sink.put_file("vk_photos/1.jpg", b"x".to_vec()).await.unwrap_err();
        assert!(matches!(err, UploadError::TargetRequest { .. }));
        assert_eq!(store.push_count(), 0);
    }

    #[tokio::test]
    async fn test_push_failure_reported_separately() {
        let mut store = MemoryStore::new();
        store.fail_push_for.insert("vk_photos/1.jpg".into());
        let sink = TransferSink::new(&store, "vk_photos");

        let err = sink.put_file("vk_photos/1.jpg", b"x".to_vec()).await.unwrap_err();
        assert!(matches!(err, UploadError::Push { .. }));
        assert!(store.file("vk_photos/1.jpg").is_none());
    }

    #[tokio::test]
    async fn test_transfer_outcome() {
        let mut store = MemoryStore::new();
        store.fail_push_for.insert("vk_photos/2.jpg".into());
        let sink = TransferSink::new(&store, "vk_photos");

        let ok = sink
            .transfer("1.jpg".into(), "https://cdn/1".into(), b"1".to_vec())
            .await;
        assert!(ok.succeeded());
        assert_eq!(ok.file_name, "1.jpg");
        assert_eq!(ok.source_url, "https://cdn/1");

        let failed = sink
            .transfer("2.jpg".into(), "https://cdn/2".into(), b"2".to_vec())
            .await;
        assert!(!failed.succeeded());
    }
}
