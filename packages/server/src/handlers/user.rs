use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use sea_orm::*;
use tracing::instrument;

use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::shared::normalize_email;
use crate::models::user::{
    AuthResponse, LoginRequest, RegisterRequest, UserResponse, validate_login_request,
    validate_register_request,
};
use crate::state::AppState;
use crate::utils::{hash, jwt};

fn issue_token(state: &AppState, user: &user::Model) -> Result<String, AppError> {
    jwt::sign(&state.config.auth, user.id, &user.email, user.is_admin)
        .map_err(|e| AppError::Internal(format!("JWT sign error: {e}")))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Users",
    operation_id = "registerUser",
    summary = "Register a new account",
    description = "Creates a regular (non-admin) user and returns it with a bearer token. \
        Emails are compared ignoring case.",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = AuthResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Email already registered (EMAIL_TAKEN)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_register_request(&payload)?;

    let email = normalize_email(&payload.email);

    let exists = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?
        .is_some();
    if exists {
        return Err(AppError::EmailTaken);
    }

    let hash = hash::hash_password(&payload.password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {e}")))?;

    let now = chrono::Utc::now();
    let new_user = user::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        email: Set(email),
        password: Set(hash),
        is_admin: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let user = new_user.insert(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            tracing::debug!("Registration race condition: unique constraint caught on insert");
            AppError::EmailTaken
        }
        _ => AppError::from(e),
    })?;

    tracing::info!(user_id = user.id, "Registered user");

    let token = issue_token(&state, &user)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: UserResponse::from(user),
            token,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "Users",
    operation_id = "loginUser",
    summary = "Log in with email and password",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Wrong email or password (INVALID_CREDENTIALS)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    validate_login_request(&payload)?;

    let user = user::Entity::find()
        .filter(user::Column::Email.eq(payload.normalized_email()))
        .one(&state.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let is_valid = hash::verify_password(&payload.password, &user.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {e}")))?;

    if !is_valid {
        return Err(AppError::InvalidCredentials);
    }

    let token = issue_token(&state, &user)?;
    Ok(Json(AuthResponse {
        user: UserResponse::from(user),
        token,
    }))
}

#[utoipa::path(
    get,
    path = "/profile",
    tag = "Users",
    operation_id = "getProfile",
    summary = "Current user's profile",
    responses(
        (status = 200, description = "Profile", body = UserResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Account no longer exists (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn profile(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, AppError> {
    let user = user::Entity::find_by_id(auth_user.user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(Json(UserResponse::from(user)))
}
