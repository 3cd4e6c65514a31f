use std::path::PathBuf;

use axum::extract::Multipart;
use axum::extract::multipart::Field;
use common::storage::StagedFile;
use common::storage::naming::guess_content_type;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::AppError;

/// The named file parts of a model upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadSlot {
    /// Primary geometry, required.
    Glb,
    /// Secondary geometry for iOS Quick Look, required.
    Usdz,
    /// Preview image, optional.
    Poster,
}

impl UploadSlot {
    pub const ALL: [UploadSlot; 3] = [Self::Glb, Self::Usdz, Self::Poster];

    pub fn field_name(self) -> &'static str {
        match self {
            Self::Glb => "glbFile",
            Self::Usdz => "usdzFile",
            Self::Poster => "posterImage",
        }
    }

    pub fn from_field_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.field_name() == name)
    }

    pub fn is_required(self) -> bool {
        !matches!(self, Self::Poster)
    }
}

/// Files staged on local disk for one upload call.
///
/// Call [`StagedUpload::discard`] once the call is done, whatever its outcome.
#[derive(Debug, Default)]
pub struct StagedUpload {
    pub glb_file: Option<StagedFile>,
    pub usdz_file: Option<StagedFile>,
    pub poster_image: Option<StagedFile>,
}

impl StagedUpload {
    pub fn get(&self, slot: UploadSlot) -> Option<&StagedFile> {
        match slot {
            UploadSlot::Glb => self.glb_file.as_ref(),
            UploadSlot::Usdz => self.usdz_file.as_ref(),
            UploadSlot::Poster => self.poster_image.as_ref(),
        }
    }

    fn slot_mut(&mut self, slot: UploadSlot) -> &mut Option<StagedFile> {
        match slot {
            UploadSlot::Glb => &mut self.glb_file,
            UploadSlot::Usdz => &mut self.usdz_file,
            UploadSlot::Poster => &mut self.poster_image,
        }
    }

    /// Staged files in processing order.
    pub fn files(&self) -> impl Iterator<Item = (UploadSlot, &StagedFile)> {
        UploadSlot::ALL
            .into_iter()
            .filter_map(|slot| self.get(slot).map(|file| (slot, file)))
    }

    /// Remove every staged temp file. Best effort.
    pub async fn discard(self) {
        for file in [self.glb_file, self.usdz_file, self.poster_image]
            .into_iter()
            .flatten()
        {
            if let Err(e) = tokio::fs::remove_file(&file.path).await {
                tracing::warn!(path = %file.path.display(), error = %e, "Failed to remove staged file");
            }
        }
    }

    /// Read the multipart body into temp files under `staging_dir`.
    ///
    /// Unknown fields are skipped. A file part with an empty filename and no
    /// content (a form input left blank) counts as absent. On error, anything
    /// staged so far is removed before returning.
    pub async fn from_multipart(
        multipart: &mut Multipart,
        staging_dir: &std::path::Path,
        max_size: u64,
    ) -> Result<Self, AppError> {
        let mut staged = StagedUpload::default();
        match staged.read_parts(multipart, staging_dir, max_size).await {
            Ok(()) => Ok(staged),
            Err(e) => {
                staged.discard().await;
                Err(e)
            }
        }
    }

    async fn read_parts(
        &mut self,
        multipart: &mut Multipart,
        staging_dir: &std::path::Path,
        max_size: u64,
    ) -> Result<(), AppError> {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
        {
            let Some(slot) = field.name().and_then(UploadSlot::from_field_name) else {
                continue;
            };
            if self.get(slot).is_some() {
                return Err(AppError::Validation(format!(
                    "Field '{}' may only be sent once",
                    slot.field_name()
                )));
            }

            if let Some(file) = stage_field(field, slot, staging_dir, max_size).await? {
                *self.slot_mut(slot) = Some(file);
            }
        }
        Ok(())
    }
}

async fn stage_field(
    mut field: Field<'_>,
    slot: UploadSlot,
    staging_dir: &std::path::Path,
    max_size: u64,
) -> Result<Option<StagedFile>, AppError> {
    let original_name = field.file_name().unwrap_or_default().to_string();
    let declared_type = field.content_type().map(str::to_string);
    let temp_path: PathBuf = staging_dir.join(format!("modelvault-upload-{}", Uuid::new_v4()));

    let result = async {
        let mut temp_file = tokio::fs::File::create(&temp_path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create temp file: {e}")))?;

        let mut total_size: u64 = 0;

        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?
        {
            total_size += chunk.len() as u64;
            if total_size > max_size {
                return Err(AppError::FileTooLarge {
                    field: slot.field_name().to_string(),
                    limit: max_size,
                });
            }
            temp_file
                .write_all(&chunk)
                .await
                .map_err(|e| AppError::Internal(format!("Temp file write failed: {e}")))?;
        }

        temp_file
            .flush()
            .await
            .map_err(|e| AppError::Internal(format!("Temp file flush failed: {e}")))?;

        Ok(total_size)
    }
    .await;

    let size = match result {
        Ok(size) => size,
        Err(e) => {
            // Best effort.
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e);
        }
    };

    if original_name.is_empty() {
        let _ = tokio::fs::remove_file(&temp_path).await;
        if size == 0 {
            return Ok(None);
        }
        return Err(AppError::Validation(format!(
            "Field '{}' must be a file upload with a filename",
            slot.field_name()
        )));
    }

    let content_type = declared_type
        .filter(|t| !t.is_empty() && t != "application/octet-stream")
        .unwrap_or_else(|| guess_content_type(&original_name));

    tracing::debug!(field = slot.field_name(), %original_name, size, "Staged upload part");

    Ok(Some(StagedFile {
        path: temp_path,
        original_name,
        content_type,
        size,
    }))
}
