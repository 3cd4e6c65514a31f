use common::config::StorageAppConfig;
use common::storage::FileStore;
use common::storage::naming::{file_extension, validate_flat_filename};

use super::staging::{StagedUpload, UploadSlot};
use crate::error::AppError;

/// Publicly resolvable URL per upload slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUrls {
    pub glb_file: String,
    pub usdz_file: String,
    pub poster_image: Option<String>,
}

/// Turns staged upload parts into stored files with public URLs.
pub struct UploadResolver<'a> {
    store: &'a dyn FileStore,
    storage: &'a StorageAppConfig,
}

impl<'a> UploadResolver<'a> {
    pub fn new(store: &'a dyn FileStore, storage: &'a StorageAppConfig) -> Self {
        Self { store, storage }
    }

    /// Check the staged set without touching the storage backend.
    ///
    /// Checks run in three passes over all slots: required slots present,
    /// then extensions (and filename safety), then sizes. The first failure wins.
    pub fn validate(&self, upload: &StagedUpload) -> Result<(), AppError> {
        for slot in UploadSlot::ALL {
            if slot.is_required() && upload.get(slot).is_none() {
                return Err(AppError::MissingRequiredFile(slot.field_name().to_string()));
            }
        }

        for (slot, file) in upload.files() {
            validate_flat_filename(&file.original_name).map_err(|e| {
                AppError::Validation(format!("{}: {}", slot.field_name(), e.message()))
            })?;

            let allowed = self.allowed_extensions(slot);
            match file_extension(&file.original_name) {
                Some(ext) if allowed.iter().any(|a| a.eq_ignore_ascii_case(&ext)) => {}
                Some(ext) => {
                    return Err(AppError::UnsupportedFileType(format!(
                        "{}: '.{ext}' files are not accepted (allowed: {})",
                        slot.field_name(),
                        allowed.join(", ")
                    )));
                }
                None => {
                    return Err(AppError::UnsupportedFileType(format!(
                        "{}: files without an extension are not accepted (allowed: {})",
                        slot.field_name(),
                        allowed.join(", ")
                    )));
                }
            }
        }

        for (slot, file) in upload.files() {
            if file.size > self.storage.max_file_size {
                return Err(AppError::FileTooLarge {
                    field: slot.field_name().to_string(),
                    limit: self.storage.max_file_size,
                });
            }
        }

        Ok(())
    }

    fn allowed_extensions(&self, slot: UploadSlot) -> &[String] {
        match slot {
            UploadSlot::Glb | UploadSlot::Usdz => &self.storage.model_extensions,
            UploadSlot::Poster => &self.storage.image_extensions,
        }
    }

    /// Validate, then store each file in order (primary, secondary, poster).
    ///
    /// Stops at the first storage failure; files stored before it stay where they are.
    /// Staged temp files are left to the caller.
    pub async fn resolve(
        &self,
        upload: &StagedUpload,
        user_id: i32,
    ) -> Result<ResolvedUrls, AppError> {
        self.validate(upload)?;

        let mut glb_file = None;
        let mut usdz_file = None;
        let mut poster_image = None;

        for (slot, file) in upload.files() {
            let url = self.store.store(file, user_id).await.map_err(|e| {
                tracing::error!(field = slot.field_name(), error = %e, "Failed to store upload");
                AppError::from(e)
            })?;
            match slot {
                UploadSlot::Glb => glb_file = Some(url),
                UploadSlot::Usdz => usdz_file = Some(url),
                UploadSlot::Poster => poster_image = Some(url),
            }
        }

        match (glb_file, usdz_file) {
            (Some(glb_file), Some(usdz_file)) => Ok(ResolvedUrls {
                glb_file,
                usdz_file,
                poster_image,
            }),
            _ => Err(AppError::Internal(
                "required upload slot produced no URL".into(),
            )),
        }
    }
}
