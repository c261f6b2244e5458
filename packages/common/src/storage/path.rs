use super::error::StorageError;

/// Maximum length of a relative blob path in bytes.
const MAX_PATH_LENGTH: usize = 512;

/// Validate a relative blob path and return it trimmed.
///
/// Paths address blobs within the store root, e.g. `imagenes/blog/abc123.png`.
/// Rejects anything that could escape the root or produce surprising
/// filesystem entries: absolute paths, `..` components, backslashes, hidden
/// segments, control characters, and empty or over-long paths.
pub fn validate_blob_path(path: &str) -> Result<&str, StorageError> {
    let path = path.trim();

    if path.is_empty() {
        return Err(StorageError::InvalidPath("path must not be empty".into()));
    }
    if path.len() > MAX_PATH_LENGTH {
        return Err(StorageError::InvalidPath(format!(
            "path exceeds {MAX_PATH_LENGTH} bytes"
        )));
    }
    if path.starts_with('/') || path.ends_with('/') {
        return Err(StorageError::InvalidPath(
            "path must be relative without a trailing slash".into(),
        ));
    }
    if path.contains('\\') {
        return Err(StorageError::InvalidPath(
            "backslashes are not allowed".into(),
        ));
    }
    if path.chars().any(|c| c == '\0' || c.is_control()) {
        return Err(StorageError::InvalidPath(
            "control characters are not allowed".into(),
        ));
    }
    if path.contains("//") {
        return Err(StorageError::InvalidPath(
            "consecutive slashes are not allowed".into(),
        ));
    }
    for segment in path.split('/') {
        if segment == ".." || segment == "." {
            return Err(StorageError::InvalidPath(
                "path traversal is not allowed".into(),
            ));
        }
        if segment.starts_with('.') {
            return Err(StorageError::InvalidPath(
                "hidden path segments are not allowed".into(),
            ));
        }
    }

    Ok(path)
}
