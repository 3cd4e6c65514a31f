use common::RequestStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A customer's ask for a 3D asset.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "request")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Owning user.
    #[sea_orm(indexed)]
    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    #[sea_orm(column_type = "Text")]
    pub specifications: String,

    #[sea_orm(column_type = "Text")]
    pub additional_notes: Option<String>,

    pub status: RequestStatus,

    /// Set exactly once, by a successful publish.
    pub model_id: Option<Uuid>,

    #[sea_orm(has_one)]
    pub model: HasOne<super::model::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
