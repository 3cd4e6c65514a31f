use anyhow::Context;
use sea_orm::*;
use tracing::info;

use crate::config::AdminSeedConfig;
use crate::entity::user;
use crate::models::shared::normalize_email;
use crate::utils::hash;

/// Create the bootstrap administrator unless an account with that email exists.
///
/// An existing account is left untouched, password included.
pub async fn seed_admin(db: &DatabaseConnection, admin: &AdminSeedConfig) -> anyhow::Result<()> {
    let email = normalize_email(&admin.email);
    let password = hash::hash_password(&admin.password)
        .map_err(|e| anyhow::anyhow!("failed to hash admin password: {e}"))?;

    let now = chrono::Utc::now();
    let model = user::ActiveModel {
        name: Set(admin.name.trim().to_string()),
        email: Set(email.clone()),
        password: Set(password),
        is_admin: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = user::Entity::insert(model)
        .on_conflict(
            sea_orm::sea_query::OnConflict::column(user::Column::Email)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await;

    match result {
        Ok(0) | Err(DbErr::RecordNotInserted) => {
            info!(%email, "Admin account already present");
        }
        Ok(_) => info!(%email, "Seeded admin account"),
        Err(e) => return Err(e).context("failed to seed admin account"),
    }
    Ok(())
}
