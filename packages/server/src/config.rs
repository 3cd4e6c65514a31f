use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub use common::config::{S3AppConfig, StorageAppConfig};

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Public address of this backend. Relative upload URLs are expanded
    /// against it when rendering the viewer page.
    pub public_base_url: String,
    /// Front-end origin that serves `/embed/{id}`; embed snippets point here.
    pub embed_base_url: String,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_days: i64,
}

/// Administrator account created on startup when it does not exist yet.
#[derive(Debug, Deserialize, Clone)]
pub struct AdminSeedConfig {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageAppConfig,
    #[serde(default)]
    pub admin: Option<AdminSeedConfig>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("MODELVAULT_CONFIG").unwrap_or_else(|_| "config/config".to_string());

        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5001)?
            .set_default("server.public_base_url", "http://localhost:5001")?
            .set_default("server.embed_base_url", "http://localhost:3000")?
            .set_default("server.cors.allow_origins", vec!["http://localhost:3000"])?
            .set_default("server.cors.max_age", 3600)?
            .set_default("database.max_connections", 20)?
            .set_default("database.min_connections", 2)?
            .set_default("auth.token_ttl_days", 30)?
            // Load from config/config.toml
            .add_source(File::with_name(&config_path).required(false))
            // Override from environment (e.g., MODELVAULT__AUTH__JWT_SECRET)
            .add_source(
                Environment::with_prefix("MODELVAULT")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors.allow_origins")
                    .with_list_parse_key("storage.model_extensions")
                    .with_list_parse_key("storage.image_extensions")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }
}
