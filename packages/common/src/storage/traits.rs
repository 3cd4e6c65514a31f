use std::path::PathBuf;

use async_trait::async_trait;

use super::error::StorageError;

/// An uploaded payload that has been spooled to a temporary file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    /// Location of the temporary copy.
    pub path: PathBuf,
    /// Filename as sent by the client.
    pub original_name: String,
    /// Declared MIME type.
    pub content_type: String,
    /// Size in bytes.
    pub size: u64,
}

/// Destination for published files.
///
/// One implementation is picked at startup and shared by every request, so the
/// remote/local decision is never made per file.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Persist the staged file on behalf of `user_id` and return its public URL.
    ///
    /// The staged file is left in place; removing it is the caller's job.
    async fn store(&self, file: &StagedFile, user_id: i32) -> Result<String, StorageError>;

    /// Whether files leave this host.
    fn is_remote(&self) -> bool;
}
