use axum::{
    Json,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::EntityTrait;
use tracing::instrument;
use uuid::Uuid;

use crate::config::StorageAppConfig;
use crate::entity::model;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::handlers::request::find_request;
use crate::models::model::{EmbedCodeResponse, ModelResponse, PublicModelData, PublishResponse};
use crate::pipeline::{ModelPublisher, StagedUpload, UploadResolver};
use crate::state::AppState;

/// Room for three files at the per-file ceiling plus multipart framing.
pub fn upload_body_limit(storage: &StorageAppConfig) -> DefaultBodyLimit {
    let limit = storage
        .max_file_size
        .saturating_mul(3)
        .saturating_add(1024 * 1024);
    DefaultBodyLimit::max(usize::try_from(limit).unwrap_or(usize::MAX))
}

/// Model ids that are not UUIDs cannot exist, so they are reported as missing.
pub fn parse_model_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::ModelNotFound)
}

pub async fn find_model<C: sea_orm::ConnectionTrait>(
    db: &C,
    raw_id: &str,
) -> Result<model::Model, AppError> {
    let id = parse_model_id(raw_id)?;
    model::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(AppError::ModelNotFound)
}

/// The requester of the model's Request, or an administrator.
async fn authorize_model_access(
    state: &AppState,
    auth_user: &AuthUser,
    found: &model::Model,
) -> Result<(), AppError> {
    if auth_user.is_admin {
        return Ok(());
    }
    let owner = find_request(&state.db, found.request_id).await?;
    auth_user.require_owner_or_admin(owner.user_id)
}

#[utoipa::path(
    post,
    path = "/upload/{request_id}",
    tag = "Models",
    operation_id = "uploadModelFiles",
    summary = "Upload model files and publish them for a request (admin)",
    description = "Multipart fields: `glbFile` and `usdzFile` (required), `posterImage` (optional). \
        Files go to the object store when it is fully configured, otherwise to local disk. \
        On success a Model is created with its embed snippet and the request becomes `Completed`. \
        A request can be published once; later attempts get `CONFLICT`.",
    params(("request_id" = i32, Path, description = "Request ID")),
    request_body(content_type = "multipart/form-data", description = "glbFile, usdzFile, optional posterImage"),
    responses(
        (status = 201, description = "Model published", body = PublishResponse),
        (status = 400, description = "Bad upload (MISSING_REQUIRED_FILE, UNSUPPORTED_FILE_TYPE, VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not an administrator (UNAUTHORIZED)", body = ErrorBody),
        (status = 404, description = "No such request (REQUEST_NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Request already has a model (CONFLICT)", body = ErrorBody),
        (status = 413, description = "A file exceeds the size ceiling (FILE_TOO_LARGE)", body = ErrorBody),
        (status = 502, description = "Storage backend failed (STORAGE_BACKEND_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = auth_user.user_id))]
pub async fn upload_model_files(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(request_id): Path<i32>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;

    let publisher = ModelPublisher::new(&state.db, &state.config.server.embed_base_url);
    publisher.ensure_publishable(request_id).await?;

    let storage = &state.config.storage;
    let staged =
        StagedUpload::from_multipart(&mut multipart, &storage.staging_dir, storage.max_file_size)
            .await?;

    let result = async {
        let urls = UploadResolver::new(&*state.file_store, storage)
            .resolve(&staged, auth_user.user_id)
            .await?;
        publisher.publish(request_id, urls, auth_user.user_id).await
    }
    .await;

    staged.discard().await;
    let published = result?;

    let (kind, label) = if state.file_store.is_remote() {
        ("remote", "remote storage")
    } else {
        ("local", "local storage")
    };

    Ok((
        StatusCode::CREATED,
        Json(PublishResponse {
            message: format!("Model files uploaded successfully to {label}"),
            storage: kind,
            model: published.into(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Models",
    operation_id = "getModel",
    summary = "Get a model",
    description = "Visible to the owner of the model's request and to administrators.",
    params(("id" = String, Path, description = "Model ID (UUID)")),
    responses(
        (status = 200, description = "Model", body = ModelResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner (UNAUTHORIZED)", body = ErrorBody),
        (status = 404, description = "No such model (MODEL_NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_model(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ModelResponse>, AppError> {
    let found = find_model(&state.db, &id).await?;
    authorize_model_access(&state, &auth_user, &found).await?;
    Ok(Json(found.into()))
}

#[utoipa::path(
    get,
    path = "/{id}/embed-code",
    tag = "Models",
    operation_id = "getEmbedCode",
    summary = "Get a model's iframe snippet",
    params(("id" = String, Path, description = "Model ID (UUID)")),
    responses(
        (status = 200, description = "Embed snippet", body = EmbedCodeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner (UNAUTHORIZED)", body = ErrorBody),
        (status = 404, description = "No such model (MODEL_NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_embed_code(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EmbedCodeResponse>, AppError> {
    let found = find_model(&state.db, &id).await?;
    authorize_model_access(&state, &auth_user, &found).await?;
    Ok(Json(EmbedCodeResponse {
        embed_code: found.embed_code,
    }))
}

#[utoipa::path(
    get,
    path = "/embed/{id}",
    tag = "Models",
    operation_id = "getPublicModelData",
    summary = "Resolved file URLs for embedding",
    description = "Public. Returns only the URLs a viewer needs.",
    params(("id" = String, Path, description = "Model ID (UUID)")),
    responses(
        (status = 200, description = "Model file URLs", body = PublicModelData),
        (status = 404, description = "No such model (MODEL_NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_public_model_data(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PublicModelData>, AppError> {
    let found = find_model(&state.db, &id).await?;
    Ok(Json(found.into()))
}
