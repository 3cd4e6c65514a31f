use std::sync::Arc;

use common::storage::FileStore;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: DatabaseConnection,
    /// Chosen once at startup; never swapped while serving.
    pub file_store: Arc<dyn FileStore>,
}
