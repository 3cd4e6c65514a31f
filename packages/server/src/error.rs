use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::storage::StorageError;
use sea_orm::DbErr;
use serde::Serialize;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `MISSING_REQUIRED_FILE`,
    /// `UNSUPPORTED_FILE_TYPE`, `FILE_TOO_LARGE`, `STORAGE_BACKEND_ERROR`,
    /// `REQUEST_NOT_FOUND`, `MODEL_NOT_FOUND`, `NOT_FOUND`, `UNAUTHORIZED`, `TOKEN_MISSING`,
    /// `TOKEN_INVALID`, `INVALID_CREDENTIALS`, `EMAIL_TAKEN`, `CONFLICT`, `INTERNAL_ERROR`.
    #[schema(example = "UNSUPPORTED_FILE_TYPE")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "usdzFile: '.txt' files are not accepted (allowed: glb, usdz)")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    /// A required upload slot was not sent.
    MissingRequiredFile(String),
    UnsupportedFileType(String),
    FileTooLarge {
        field: String,
        limit: u64,
    },
    /// The storage backend failed; nothing is retried.
    StorageBackend(String),
    RequestNotFound,
    ModelNotFound,
    NotFound(String),
    /// Caller is neither the owner of the resource nor an administrator.
    Unauthorized,
    TokenMissing,
    TokenInvalid,
    InvalidCredentials,
    EmailTaken,
    Conflict(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::MissingRequiredFile(field) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "MISSING_REQUIRED_FILE",
                    message: format!("Both GLB and USDZ files are required (missing '{field}')"),
                },
            ),
            AppError::UnsupportedFileType(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "UNSUPPORTED_FILE_TYPE",
                    message: msg,
                },
            ),
            AppError::FileTooLarge { field, limit } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorBody {
                    code: "FILE_TOO_LARGE",
                    message: format!("{field}: file exceeds maximum size of {limit} bytes"),
                },
            ),
            AppError::StorageBackend(detail) => {
                tracing::error!("Storage backend error: {}", detail);
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorBody {
                        code: "STORAGE_BACKEND_ERROR",
                        message: "Failed to store uploaded files".into(),
                    },
                )
            }
            AppError::RequestNotFound => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "REQUEST_NOT_FOUND",
                    message: "Request not found".into(),
                },
            ),
            AppError::ModelNotFound => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "MODEL_NOT_FOUND",
                    message: "Model not found".into(),
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::Unauthorized => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    code: "UNAUTHORIZED",
                    message: "Not authorized to access this resource".into(),
                },
            ),
            AppError::TokenMissing => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_MISSING",
                    message: "Authentication required".into(),
                },
            ),
            AppError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_INVALID",
                    message: "Invalid or expired token".into(),
                },
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "INVALID_CREDENTIALS",
                    message: "Invalid email or password".into(),
                },
            ),
            AppError::EmailTaken => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "EMAIL_TAKEN",
                    message: "A user with this email already exists".into(),
                },
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "CONFLICT",
                    message: msg,
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidFilename(msg) => AppError::Validation(msg.into()),
            other => AppError::StorageBackend(other.to_string()),
        }
    }
}
