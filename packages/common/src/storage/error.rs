use thiserror::Error;

/// Errors that can occur while persisting an uploaded file.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Local filesystem failure (disk full, permissions, missing temp file).
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The remote object store rejected or failed the request.
    #[error("remote storage error: {0}")]
    Remote(String),

    /// The original filename cannot be used as a storage name.
    #[error("invalid filename: {0}")]
    InvalidFilename(&'static str),
}
