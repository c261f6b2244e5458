use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::BufReader;

use super::error::StorageError;
use super::path::validate_blob_path;
use super::traits::{BlobStore, BoxReader};

/// Filesystem-backed path-addressed blob store.
///
/// Blobs live directly under `{base_path}/{relative_path}`. Writes go
/// through a temp file and a rename so a crash never leaves a partial blob
/// at its final path.
pub struct FilesystemBlobStore {
    base_path: PathBuf,
    max_size: u64,
    temp_counter: AtomicU64,
}

impl FilesystemBlobStore {
    /// Create a new filesystem blob store rooted at `base_path`.
    pub async fn new(base_path: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self {
            base_path,
            max_size,
            temp_counter: AtomicU64::new(0),
        })
    }

    /// Resolve and validate the filesystem path for a relative blob path.
    fn blob_path(&self, path: &str) -> Result<PathBuf, StorageError> {
        let path = validate_blob_path(path)?;
        Ok(self.base_path.join(path))
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        let n = self.temp_counter.fetch_add(1, Ordering::Relaxed);
        self.base_path
            .join(".tmp")
            .join(format!("{}-{n}", std::process::id()))
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn put(&self, path: &str, data: &[u8]) -> Result<(), StorageError> {
        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        let blob_path = self.blob_path(path)?;
        if fs::try_exists(&blob_path).await? {
            return Err(StorageError::AlreadyExists(path.trim().to_string()));
        }

        if let Some(parent) = blob_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&temp_path, &blob_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        let blob_path = self.blob_path(path)?;
        Ok(fs::try_exists(&blob_path).await?)
    }

    async fn delete(&self, path: &str) -> Result<bool, StorageError> {
        let blob_path = self.blob_path(path)?;
        match fs::remove_file(&blob_path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_stream(&self, path: &str) -> Result<BoxReader, StorageError> {
        let blob_path = self.blob_path(path)?;
        match fs::File::open(&blob_path).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(path.trim().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;

    use super::*;

    async fn temp_store() -> (FilesystemBlobStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemBlobStore::new(dir.path().join("blobs"), 2 * 1024 * 1024)
            .await
            .unwrap();
        (store, dir)
    }

    async fn read_all(store: &FilesystemBlobStore, path: &str) -> Vec<u8> {
        let mut reader = store.get_stream(path).await.unwrap();
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await.unwrap();
        buf
    }

    #[tokio::test]
    async fn put_get_round_trip() {
        let (store, _dir) = temp_store().await;
        store.put("imagenes/a.png", b"png bytes").await.unwrap();
        assert_eq!(read_all(&store, "imagenes/a.png").await, b"png bytes");
    }

    #[tokio::test]
    async fn put_refuses_overwrite() {
        let (store, _dir) = temp_store().await;
        store.put("x.png", b"first").await.unwrap();
        let result = store.put("x.png", b"second").await;
        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));
        // Original content untouched.
        assert_eq!(read_all(&store, "x.png").await, b"first");
    }

    #[tokio::test]
    async fn put_creates_nested_directories() {
        let (store, _dir) = temp_store().await;
        store.put("a/b/c/deep.png", b"data").await.unwrap();
        assert!(store.exists("a/b/c/deep.png").await.unwrap());
    }

    #[tokio::test]
    async fn put_rejects_traversal_paths() {
        let (store, _dir) = temp_store().await;
        let result = store.put("../escape.png", b"data").await;
        assert!(matches!(result, Err(StorageError::InvalidPath(_))));
    }

    #[tokio::test]
    async fn size_limit_enforced() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemBlobStore::new(dir.path().join("blobs"), 10)
            .await
            .unwrap();

        let result = store.put("big.png", b"this is more than 10 bytes").await;
        assert!(matches!(result, Err(StorageError::SizeLimitExceeded { .. })));
        assert!(!store.exists("big.png").await.unwrap());
    }

    #[tokio::test]
    async fn exists_works() {
        let (store, _dir) = temp_store().await;
        store.put("here.png", b"data").await.unwrap();
        assert!(store.exists("here.png").await.unwrap());
        assert!(!store.exists("missing.png").await.unwrap());
    }

    #[tokio::test]
    async fn delete_removes_blob() {
        let (store, _dir) = temp_store().await;
        store.put("gone.png", b"data").await.unwrap();
        assert!(store.delete("gone.png").await.unwrap());
        assert!(!store.exists("gone.png").await.unwrap());
    }

    #[tokio::test]
    async fn delete_nonexistent_returns_false() {
        let (store, _dir) = temp_store().await;
        assert!(!store.delete("never/stored.png").await.unwrap());
    }

    #[tokio::test]
    async fn get_not_found() {
        let (store, _dir) = temp_store().await;
        let result = store.get_stream("missing.png").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn constructor_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("deep/nested/blobs");
        assert!(!base.exists());

        let _store = FilesystemBlobStore::new(base.clone(), 1024).await.unwrap();

        assert!(base.exists());
        assert!(base.join(".tmp").exists());
    }
}
