use async_trait::async_trait;
use tokio::io::AsyncRead;

use super::error::StorageError;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Path-addressed blob storage for uploaded files.
///
/// Paths are relative to the store root (e.g. `imagenes/blog/xyz.png`) and
/// are validated before any filesystem access.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes at the given relative path.
    ///
    /// Fails with [`StorageError::AlreadyExists`] if a blob is already
    /// present at that path; callers are expected to choose fresh names.
    async fn put(&self, path: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Check whether a blob exists at the given path.
    async fn exists(&self, path: &str) -> Result<bool, StorageError>;

    /// Delete the blob at the given path.
    ///
    /// Returns `true` if the blob was deleted, `false` if it did not exist.
    /// Deleting an absent path is not an error.
    async fn delete(&self, path: &str) -> Result<bool, StorageError>;

    /// Retrieve a blob as a streaming async reader.
    async fn get_stream(&self, path: &str) -> Result<BoxReader, StorageError>;
}
