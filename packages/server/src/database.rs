use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

use crate::config::DatabaseConfig;

pub async fn init_db(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(config.url.to_owned());

    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    create_tables(&db).await?;

    Ok(db)
}

/// Brings the `user`, `request` and `model` tables in line with the entities.
pub async fn create_tables(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.get_schema_registry("modelvault::entity::*")
        .sync(db)
        .await
}
