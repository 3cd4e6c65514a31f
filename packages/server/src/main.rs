use std::net::SocketAddr;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use modelvault::config::AppConfig;
use modelvault::state::AppState;
use modelvault::storage::build_file_store;
use modelvault::{build_router, database, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;

    let db = database::init_db(&config.database)
        .await
        .context("failed to connect to database")?;

    match &config.admin {
        Some(admin) => seed::seed_admin(&db, admin).await?,
        None => tracing::info!("No admin account configured; skipping admin seeding"),
    }

    let file_store = build_file_store(&config.storage)
        .await
        .context("failed to initialise upload storage")?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid server.host/server.port")?;

    let state = AppState {
        config,
        db,
        file_store,
    };
    let app = build_router(state);

    tracing::info!("ModelVault listening on http://{}", addr);
    tracing::info!("API docs at http://{}/swagger-ui and http://{}/scalar", addr, addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
