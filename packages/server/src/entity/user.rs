use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    /// Stored trimmed and lower-cased, which makes uniqueness case-insensitive.
    #[sea_orm(unique)]
    pub email: String,

    /// Argon2 PHC string.
    #[serde(skip_serializing)]
    pub password: String,

    #[sea_orm(default_value = false)]
    pub is_admin: bool,

    #[sea_orm(has_many)]
    pub requests: HasMany<super::request::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
