use axum::{Json, extract::State};
use serde::Serialize;

use crate::error::{AppError, ErrorBody};
use crate::state::AppState;

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: &'static str,
    /// Storage backend in use: `remote` or `local`.
    #[schema(example = "local")]
    pub storage: &'static str,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    operation_id = "health",
    summary = "Liveness and database reachability",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse),
        (status = 500, description = "Database unreachable (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    state.db.ping().await?;
    Ok(Json(HealthResponse {
        status: "ok",
        storage: if state.file_store.is_remote() {
            "remote"
        } else {
            "local"
        },
    }))
}
