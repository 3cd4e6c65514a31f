use serde::{Deserialize, Serialize};

use crate::entity::user;
use crate::error::AppError;
use crate::models::shared::{normalize_email, validate_text};

/// Request body for user registration.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    /// Display name (1-100 characters).
    #[schema(example = "Alice Doe")]
    pub name: String,
    /// Email address, unique ignoring case.
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// Password (8-128 characters).
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_register_request(payload: &RegisterRequest) -> Result<(), AppError> {
    validate_text(&payload.name, "Name", 100)?;
    validate_email(&payload.email)?;
    if payload.password.len() < 8 || payload.password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be 8-128 characters".into(),
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), AppError> {
    let email = email.trim();
    let valid = email.len() <= 254
        && !email.chars().any(char::is_whitespace)
        && email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(AppError::Validation("Email address is not valid".into()));
    }
    Ok(())
}

/// Request body for user login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.email.trim().is_empty() {
        return Err(AppError::Validation("Email must not be empty".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

impl LoginRequest {
    pub fn normalized_email(&self) -> String {
        normalize_email(&self.email)
    }
}

/// Public view of a user. Never includes the password hash.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "Alice Doe")]
    pub name: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = false)]
    pub is_admin: bool,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            is_admin: user.is_admin,
        }
    }
}

/// Returned by registration and login.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    /// JWT bearer token.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
}
