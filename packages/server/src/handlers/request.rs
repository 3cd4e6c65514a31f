use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use common::RequestStatus;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{model, request, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::model::ModelResponse;
use crate::models::request::{
    CreateRequestRequest, RequestOwner, RequestResponse, UpdateStatusRequest,
    validate_create_request,
};
use crate::models::shared::non_blank;
use crate::state::AppState;

/// Load a request by id or fail with `REQUEST_NOT_FOUND`.
pub async fn find_request<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<request::Model, AppError> {
    request::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(AppError::RequestNotFound)
}

/// Attach published models to a batch of requests with a single query.
async fn with_models<C: ConnectionTrait>(
    db: &C,
    requests: Vec<request::Model>,
) -> Result<Vec<RequestResponse>, AppError> {
    let model_ids: Vec<_> = requests.iter().filter_map(|r| r.model_id).collect();
    let mut models: HashMap<_, _> = if model_ids.is_empty() {
        HashMap::new()
    } else {
        model::Entity::find()
            .filter(model::Column::Id.is_in(model_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect()
    };

    Ok(requests
        .into_iter()
        .map(|r| {
            let published = r
                .model_id
                .and_then(|id| models.remove(&id))
                .map(ModelResponse::from);
            RequestResponse::from(r).with_model(published)
        })
        .collect())
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Requests",
    operation_id = "createRequest",
    summary = "Submit a new asset request",
    description = "Creates a request owned by the caller, in status `Pending`.",
    request_body = CreateRequestRequest,
    responses(
        (status = 201, description = "Request created", body = RequestResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn create_request(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateRequestRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_request(&payload)?;

    let now = chrono::Utc::now();
    let new_request = request::ActiveModel {
        user_id: Set(auth_user.user_id),
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description.trim().to_string()),
        specifications: Set(payload.specifications.trim().to_string()),
        additional_notes: Set(non_blank(payload.additional_notes)),
        status: Set(RequestStatus::Pending),
        model_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = new_request.insert(&state.db).await?;
    tracing::info!(request_id = created.id, "Created request");

    Ok((StatusCode::CREATED, Json(RequestResponse::from(created))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Requests",
    operation_id = "listMyRequests",
    summary = "List the caller's requests",
    description = "Newest first. Completed requests include their published model.",
    responses(
        (status = 200, description = "Caller's requests", body = Vec<RequestResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_my_requests(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<RequestResponse>>, AppError> {
    let requests = request::Entity::find()
        .filter(request::Column::UserId.eq(auth_user.user_id))
        .order_by_desc(request::Column::CreatedAt)
        .order_by_desc(request::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(with_models(&state.db, requests).await?))
}

#[utoipa::path(
    get,
    path = "/all",
    tag = "Requests",
    operation_id = "listAllRequests",
    summary = "List every request (admin)",
    description = "Newest first, with the owner's name and email and any published model.",
    responses(
        (status = 200, description = "All requests", body = Vec<RequestResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not an administrator (UNAUTHORIZED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_all_requests(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<RequestResponse>>, AppError> {
    auth_user.require_admin()?;

    let requests = request::Entity::find()
        .order_by_desc(request::Column::CreatedAt)
        .order_by_desc(request::Column::Id)
        .all(&state.db)
        .await?;

    let mut owner_ids: Vec<i32> = requests.iter().map(|r| r.user_id).collect();
    owner_ids.sort_unstable();
    owner_ids.dedup();
    let owners: HashMap<i32, user::Model> = if owner_ids.is_empty() {
        HashMap::new()
    } else {
        user::Entity::find()
            .filter(user::Column::Id.is_in(owner_ids))
            .all(&state.db)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect()
    };

    let responses = with_models(&state.db, requests)
        .await?
        .into_iter()
        .map(|r| {
            let owner = owners.get(&r.user_id).cloned().map(RequestOwner::from);
            r.with_owner(owner)
        })
        .collect();

    Ok(Json(responses))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Requests",
    operation_id = "getRequest",
    summary = "Get a request",
    description = "Visible to the request's owner and to administrators.",
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request", body = RequestResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner (UNAUTHORIZED)", body = ErrorBody),
        (status = 404, description = "No such request (REQUEST_NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_request(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<RequestResponse>, AppError> {
    let found = find_request(&state.db, id).await?;
    auth_user.require_owner_or_admin(found.user_id)?;

    let mut responses = with_models(&state.db, vec![found]).await?;
    responses
        .pop()
        .map(Json)
        .ok_or_else(|| AppError::Internal("request vanished while loading".into()))
}

#[utoipa::path(
    put,
    path = "/{id}/status",
    tag = "Requests",
    operation_id = "updateRequestStatus",
    summary = "Change a request's status (admin)",
    params(("id" = i32, Path, description = "Request ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Updated request", body = RequestResponse),
        (status = 400, description = "Unknown status (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not an administrator (UNAUTHORIZED)", body = ErrorBody),
        (status = 404, description = "No such request (REQUEST_NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn update_request_status(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateStatusRequest>,
) -> Result<Json<RequestResponse>, AppError> {
    auth_user.require_admin()?;
    let status = payload.parse()?;

    let existing = find_request(&state.db, id).await?;
    let previous = existing.status;

    let mut active: request::ActiveModel = existing.into();
    active.status = Set(status);
    active.updated_at = Set(chrono::Utc::now());
    let updated = active.update(&state.db).await?;

    tracing::info!(request_id = id, from = %previous, to = %status, "Request status changed");

    let mut responses = with_models(&state.db, vec![updated]).await?;
    responses
        .pop()
        .map(Json)
        .ok_or_else(|| AppError::Internal("request vanished while loading".into()))
}
