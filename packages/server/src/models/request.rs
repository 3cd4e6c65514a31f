use chrono::{DateTime, Utc};
use common::RequestStatus;
use common::request_status::ParseStatusError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::{request, user};
use crate::error::AppError;
use crate::models::model::ModelResponse;
use crate::models::shared::validate_text;

/// Request body for creating an asset request.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestRequest {
    /// Short title (1-200 characters).
    #[schema(example = "Walnut lounge chair")]
    pub title: String,
    #[schema(example = "Mid-century lounge chair for the product page.")]
    pub description: String,
    /// Dimensions, materials, polygon budget and similar.
    #[schema(example = "80x75x90 cm, walnut + black leather, < 50k triangles")]
    pub specifications: String,
    #[schema(example = "Needs to look good in AR.")]
    pub additional_notes: Option<String>,
}

pub fn validate_create_request(payload: &CreateRequestRequest) -> Result<(), AppError> {
    validate_text(&payload.title, "Title", 200)?;
    validate_text(&payload.description, "Description", 10_000)?;
    validate_text(&payload.specifications, "Specifications", 10_000)?;
    if let Some(notes) = &payload.additional_notes
        && notes.chars().count() > 10_000
    {
        return Err(AppError::Validation(
            "Additional notes must be at most 10000 characters".into(),
        ));
    }
    Ok(())
}

/// Request body for an administrator status change.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateStatusRequest {
    /// One of `Pending`, `In Progress`, `Completed`, `Rejected`.
    #[schema(example = "In Progress")]
    pub status: String,
}

impl UpdateStatusRequest {
    pub fn parse(&self) -> Result<RequestStatus, AppError> {
        self.status
            .parse()
            .map_err(|e: ParseStatusError| AppError::Validation(e.to_string()))
    }
}

/// Name and email of a request's owner, included in the administrator listing.
#[derive(Serialize, utoipa::ToSchema)]
pub struct RequestOwner {
    pub id: i32,
    pub name: String,
    pub email: String,
}

impl From<user::Model> for RequestOwner {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = 7)]
    pub user_id: i32,
    pub title: String,
    pub description: String,
    pub specifications: String,
    pub additional_notes: Option<String>,
    pub status: RequestStatus,
    pub model_id: Option<Uuid>,
    /// The published model, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelResponse>,
    /// Only present in the administrator listing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<RequestOwner>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<request::Model> for RequestResponse {
    fn from(r: request::Model) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            title: r.title,
            description: r.description,
            specifications: r.specifications,
            additional_notes: r.additional_notes,
            status: r.status,
            model_id: r.model_id,
            model: None,
            user: None,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

impl RequestResponse {
    pub fn with_model(mut self, model: Option<ModelResponse>) -> Self {
        self.model = model;
        self
    }

    pub fn with_owner(mut self, owner: Option<RequestOwner>) -> Self {
        self.user = owner;
        self
    }
}
