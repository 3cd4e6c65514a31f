use async_trait::async_trait;
use ::s3::bucket::Bucket;
use ::s3::creds::Credentials;
use ::s3::region::Region;
use tokio::fs;

use super::error::StorageError;
use super::naming::{object_key, public_object_url, validate_flat_filename};
use super::traits::{FileStore, StagedFile};
use crate::config::RemoteStorageSettings;

/// S3-compatible upload store (AWS S3, MinIO, R2, ...).
///
/// Objects are written under `models/{user_id}/{original filename}`; a later
/// upload with the same name replaces the earlier object.
pub struct S3FileStore {
    bucket: Box<Bucket>,
    settings: RemoteStorageSettings,
    cdn_base: Option<String>,
}

impl S3FileStore {
    pub fn new(
        settings: RemoteStorageSettings,
        cdn_base: Option<String>,
    ) -> Result<Self, StorageError> {
        let credentials = Credentials::new(
            Some(settings.access_key.as_str()),
            Some(settings.secret_key.as_str()),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Remote(format!("invalid credentials: {e}")))?;

        let region = match &settings.endpoint {
            Some(endpoint) => Region::Custom {
                region: settings.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => settings
                .region
                .parse::<Region>()
                .map_err(|e| StorageError::Remote(format!("invalid region: {e}")))?,
        };

        let mut bucket = Bucket::new(&settings.bucket, region, credentials)
            .map_err(|e| StorageError::Remote(e.to_string()))?;
        if settings.endpoint.is_some() {
            bucket = bucket.with_path_style();
        }

        Ok(Self {
            bucket,
            settings,
            cdn_base,
        })
    }

    fn url_for(&self, key: &str) -> String {
        public_object_url(
            self.cdn_base.as_deref(),
            &self.settings.bucket,
            &self.settings.region,
            self.settings.endpoint.as_deref(),
            key,
        )
    }
}

#[async_trait]
impl FileStore for S3FileStore {
    async fn store(&self, file: &StagedFile, user_id: i32) -> Result<String, StorageError> {
        let filename = validate_flat_filename(&file.original_name)
            .map_err(|e| StorageError::InvalidFilename(e.message()))?;
        let key = object_key(user_id, filename);

        let content = fs::read(&file.path).await?;
        let response = self
            .bucket
            .put_object_with_content_type(&key, &content, &file.content_type)
            .await
            .map_err(|e| StorageError::Remote(e.to_string()))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(StorageError::Remote(format!(
                "PUT {key} returned HTTP {status}"
            )));
        }

        tracing::debug!(bucket = %self.settings.bucket, %key, size = file.size, "Uploaded object");

        Ok(self.url_for(&key))
    }

    fn is_remote(&self) -> bool {
        true
    }
}
