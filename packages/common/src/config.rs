use std::path::PathBuf;

use serde::Deserialize;

/// Credentials and location of an S3-compatible bucket.
///
/// Every field is optional so that a half-filled environment still
/// deserializes; see [`StorageAppConfig::remote`].
#[derive(Debug, Deserialize, Clone, Default)]
pub struct S3AppConfig {
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub region: Option<String>,
    pub bucket: Option<String>,
    /// Custom endpoint for MinIO, R2 and friends. AWS is used when unset.
    pub endpoint: Option<String>,
}

/// A complete set of remote storage settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteStorageSettings {
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    pub bucket: String,
    pub endpoint: Option<String>,
}

/// Upload storage configuration shared by the server and its tests.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageAppConfig {
    /// Root directory for locally stored uploads. Default: "./uploads".
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    /// Where multipart parts are staged before they are stored. Default: the OS temp dir.
    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,
    /// Per-file ceiling in bytes. Default: 100 MiB.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Extensions accepted for the geometry slots. Default: glb, usdz.
    #[serde(default = "default_model_extensions")]
    pub model_extensions: Vec<String>,
    /// Extensions accepted for the poster slot. Default: jpg, jpeg, png.
    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,
    /// CDN domain fronting the bucket, e.g. "https://d1234.cloudfront.net".
    #[serde(default)]
    pub cdn_domain: Option<String>,
    #[serde(default)]
    pub s3: S3AppConfig,
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("./uploads")
}
fn default_staging_dir() -> PathBuf {
    std::env::temp_dir()
}
fn default_max_file_size() -> u64 {
    100 * 1024 * 1024
}
fn default_model_extensions() -> Vec<String> {
    vec!["glb".into(), "usdz".into()]
}
fn default_image_extensions() -> Vec<String> {
    vec!["jpg".into(), "jpeg".into(), "png".into()]
}

impl Default for StorageAppConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            staging_dir: default_staging_dir(),
            max_file_size: default_max_file_size(),
            model_extensions: default_model_extensions(),
            image_extensions: default_image_extensions(),
            cdn_domain: None,
            s3: S3AppConfig::default(),
        }
    }
}

impl StorageAppConfig {
    /// Returns the remote settings only when access key, secret, region and
    /// bucket are all present and non-blank. Anything less means local storage.
    pub fn remote(&self) -> Option<RemoteStorageSettings> {
        fn filled(value: &Option<String>) -> Option<String> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        }

        Some(RemoteStorageSettings {
            access_key: filled(&self.s3.access_key)?,
            secret_key: filled(&self.s3.secret_key)?,
            region: filled(&self.s3.region)?,
            bucket: filled(&self.s3.bucket)?,
            endpoint: filled(&self.s3.endpoint),
        })
    }

    /// CDN domain with a scheme and without a trailing slash, if configured.
    pub fn cdn_base(&self) -> Option<String> {
        let domain = self.cdn_domain.as_deref()?.trim().trim_end_matches('/');
        if domain.is_empty() {
            return None;
        }
        if domain.starts_with("http://") || domain.starts_with("https://") {
            Some(domain.to_string())
        } else {
            Some(format!("https://{domain}"))
        }
    }
}
