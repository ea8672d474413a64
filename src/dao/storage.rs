use std::path::PathBuf;

use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by persistence backends.
///
/// Write failures are logged and swallowed by callers: the in-memory document
/// stays authoritative until the next successful write or process restart.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The storage location could not be created or written.
    #[error("failed to write {path}: {source}")]
    Write {
        /// Location the write targeted.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The document could not be serialized.
    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}
