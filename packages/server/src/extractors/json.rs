use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// JSON body extractor for the user and request endpoints.
///
/// Rejections become `VALIDATION_ERROR` responses with a message saying what
/// was wrong with the body.
pub struct AppJson<T>(pub T);

fn rejection_message(rejection: &JsonRejection) -> String {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            "Expected a JSON body (Content-Type: application/json)".to_string()
        }
        JsonRejection::JsonSyntaxError(e) => format!("Malformed JSON body: {}", e.body_text()),
        JsonRejection::JsonDataError(e) => format!("Invalid request body: {}", e.body_text()),
        other => other.body_text(),
    }
}

impl<S, T> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => {
                tracing::debug!(%rejection, "Rejected JSON body");
                Err(AppError::Validation(rejection_message(&rejection)))
            }
        }
    }
}
