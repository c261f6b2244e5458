use std::sync::Arc;

use common::storage::{BlobStore, StorageError};
use rand::Rng;
use rand::distr::Alphanumeric;

/// Length of the random filename token. 20 alphanumeric characters carry
/// just under 120 bits of entropy, so collisions are treated as negligible.
const TOKEN_LENGTH: usize = 20;

/// Image file extensions accepted for upload.
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "gif", "webp"];

/// Stores uploaded images under collision-resistant names and cleans up
/// stale blobs.
#[derive(Clone)]
pub struct ImageUploader {
    store: Arc<dyn BlobStore>,
}

impl ImageUploader {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// Write the bytes under `folder/<random token>.<extension>` and return
    /// the stored relative path.
    ///
    /// The store refuses to overwrite, so in the (negligible) event of a
    /// token collision the upload fails instead of clobbering another blob.
    pub async fn upload(
        &self,
        data: &[u8],
        extension: &str,
        folder: &str,
    ) -> Result<String, StorageError> {
        let token: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LENGTH)
            .map(char::from)
            .collect();
        let path = format!("{folder}/{token}.{extension}");
        self.store.put(&path, data).await?;
        Ok(path)
    }

    /// Delete the blob at `path` if it exists.
    ///
    /// No-op on an empty path; an absent blob is not an error.
    pub async fn delete_if_exists(&self, path: &str) -> Result<(), StorageError> {
        if path.trim().is_empty() {
            return Ok(());
        }
        if self.store.exists(path).await? {
            self.store.delete(path).await?;
        }
        Ok(())
    }
}
