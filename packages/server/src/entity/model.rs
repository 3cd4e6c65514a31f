use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A published 3D asset.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "model")]
pub struct Model {
    /// UUIDv7, allocated before insert so the embed snippet can reference it.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub request_id: i32,
    #[sea_orm(belongs_to, from = "request_id", to = "id")]
    pub request: HasOne<super::request::Entity>,

    /// Resolved URL of the GLB payload.
    pub glb_file: String,

    /// Resolved URL of the USDZ payload (iOS Quick Look).
    pub usdz_file: String,

    pub poster_image: Option<String>,

    #[sea_orm(column_type = "Text")]
    pub embed_code: String,

    pub uploaded_by: i32,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
