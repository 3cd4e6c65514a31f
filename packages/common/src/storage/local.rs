use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use super::error::StorageError;
use super::naming::{encode_url_path, timestamped_name, validate_flat_filename};
use super::traits::{FileStore, StagedFile};

/// Filesystem-backed upload store.
///
/// Files land in `{root}/{user_id}/{unix_millis}-{random}-{filename}` and are
/// addressed as `{url_prefix}/{user_id}/{stored name}`, which the server maps
/// back onto `root` with a static-file route.
pub struct LocalFileStore {
    root: PathBuf,
    url_prefix: String,
}

impl LocalFileStore {
    /// Create a new local store, creating `root` if needed.
    pub async fn new(root: PathBuf, url_prefix: &str) -> Result<Self, StorageError> {
        fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn store(&self, file: &StagedFile, user_id: i32) -> Result<String, StorageError> {
        let filename = validate_flat_filename(&file.original_name)
            .map_err(|e| StorageError::InvalidFilename(e.message()))?;

        let user_dir = self.root.join(user_id.to_string());
        fs::create_dir_all(&user_dir).await?;

        let stored_name = timestamped_name(filename);
        let dest = user_dir.join(&stored_name);

        if let Err(e) = fs::copy(&file.path, &dest).await {
            let _ = fs::remove_file(&dest).await;
            return Err(e.into());
        }

        tracing::debug!(dest = %dest.display(), size = file.size, "Stored upload locally");

        Ok(format!(
            "{}/{}/{}",
            self.url_prefix,
            user_id,
            encode_url_path(&stored_name)
        ))
    }

    fn is_remote(&self) -> bool {
        false
    }
}
