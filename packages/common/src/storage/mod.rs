mod error;
mod path;
mod traits;

pub mod filesystem;

pub use error::StorageError;
pub use path::validate_blob_path;
pub use traits::{BlobStore, BoxReader};
