use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::entity::model;

/// Full model record, returned to the request owner and administrators.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModelResponse {
    pub id: Uuid,
    #[schema(example = 1)]
    pub request_id: i32,
    #[schema(example = "https://cdn.example.com/models/7/chair.glb")]
    pub glb_file: String,
    #[schema(example = "https://cdn.example.com/models/7/chair.usdz")]
    pub usdz_file: String,
    pub poster_image: Option<String>,
    pub embed_code: String,
    pub uploaded_by: i32,
    pub created_at: DateTime<Utc>,
}

impl From<model::Model> for ModelResponse {
    fn from(m: model::Model) -> Self {
        Self {
            id: m.id,
            request_id: m.request_id,
            glb_file: m.glb_file,
            usdz_file: m.usdz_file,
            poster_image: m.poster_image,
            embed_code: m.embed_code,
            uploaded_by: m.uploaded_by,
            created_at: m.created_at,
        }
    }
}

/// Public fields of a freshly published model.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublishedModel {
    pub id: Uuid,
    pub glb_file: String,
    pub usdz_file: String,
    pub poster_image: Option<String>,
    pub embed_code: String,
}

impl From<model::Model> for PublishedModel {
    fn from(m: model::Model) -> Self {
        Self {
            id: m.id,
            glb_file: m.glb_file,
            usdz_file: m.usdz_file,
            poster_image: m.poster_image,
            embed_code: m.embed_code,
        }
    }
}

/// Response of a successful upload.
#[derive(Serialize, utoipa::ToSchema)]
pub struct PublishResponse {
    #[schema(example = "Model files uploaded successfully to local storage")]
    pub message: String,
    /// `remote` or `local`.
    #[schema(example = "local")]
    pub storage: &'static str,
    pub model: PublishedModel,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmbedCodeResponse {
    pub embed_code: String,
}

/// What an embedding page needs to render a model. Exposed without auth.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicModelData {
    pub glb_file: String,
    pub usdz_file: String,
    pub poster_image: Option<String>,
}

impl From<model::Model> for PublicModelData {
    fn from(m: model::Model) -> Self {
        Self {
            glb_file: m.glb_file,
            usdz_file: m.usdz_file,
            poster_image: m.poster_image,
        }
    }
}
