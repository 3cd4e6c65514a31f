use axum::{
    extract::{Path, State},
    response::Html,
};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::handlers::model::find_model;
use crate::pipeline::embed::{ViewerAssets, viewer_html};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/embed/{id}",
    tag = "Embed",
    operation_id = "viewModel",
    summary = "Standalone 3D viewer page",
    description = "HTML document rendering the model with `<model-viewer>`, including AR. \
        This is what embed snippets frame.",
    params(("id" = String, Path, description = "Model ID (UUID)")),
    responses(
        (status = 200, description = "Viewer page", content_type = "text/html", body = String),
        (status = 404, description = "No such model (MODEL_NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn view_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let found = find_model(&state.db, &id).await?;

    Ok(Html(viewer_html(
        ViewerAssets {
            glb_file: &found.glb_file,
            usdz_file: &found.usdz_file,
            poster_image: found.poster_image.as_deref(),
        },
        &state.config.server.public_base_url,
    )))
}
