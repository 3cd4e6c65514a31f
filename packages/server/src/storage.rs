use std::sync::Arc;

use common::config::StorageAppConfig;
use common::storage::local::LocalFileStore;
use common::storage::s3::S3FileStore;
use common::storage::{FileStore, StorageError};

/// URL prefix under which locally stored uploads are served.
pub const LOCAL_UPLOAD_URL_PREFIX: &str = "/api/uploads";

/// Pick the upload backend for the lifetime of the process.
///
/// Remote storage needs access key, secret, region and bucket all set; a
/// partial configuration falls back to local disk.
pub async fn build_file_store(config: &StorageAppConfig) -> Result<Arc<dyn FileStore>, StorageError> {
    match config.remote() {
        Some(remote) => {
            tracing::info!(
                bucket = %remote.bucket,
                region = %remote.region,
                endpoint = remote.endpoint.as_deref().unwrap_or("aws"),
                cdn = config.cdn_base().as_deref().unwrap_or("none"),
                "Using remote object storage for uploads"
            );
            Ok(Arc::new(S3FileStore::new(remote, config.cdn_base())?))
        }
        None => {
            if config.s3.access_key.is_some()
                || config.s3.secret_key.is_some()
                || config.s3.bucket.is_some()
            {
                tracing::warn!("Incomplete S3 configuration; falling back to local storage");
            }
            tracing::info!(dir = %config.upload_dir.display(), "Using local disk for uploads");
            Ok(Arc::new(
                LocalFileStore::new(config.upload_dir.clone(), LOCAL_UPLOAD_URL_PREFIX).await?,
            ))
        }
    }
}
