use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use core_access::CoreAccessError;
use serde_json::json;
use tracing::{error, warn};
use versetag::{FieldErrors, TagError};

/// A custom error type for the server application.
///
/// This enum encapsulates different kinds of errors that can occur within the server,
/// allowing them to be converted into appropriate HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Errors originating from the tagging library.
    Tag(TagError),
    /// Errors from user identity lookups.
    Access(CoreAccessError),
    /// Generic internal server errors.
    Internal(anyhow::Error),
}

impl From<TagError> for AppError {
    fn from(err: TagError) -> Self {
        AppError::Tag(err)
    }
}

impl From<CoreAccessError> for AppError {
    fn from(err: CoreAccessError) -> Self {
        AppError::Access(err)
    }
}

impl From<turso::Error> for AppError {
    fn from(err: turso::Error) -> Self {
        AppError::Tag(TagError::Database(err))
    }
}

/// Builds a single-field `BadRequestData` error.
fn bad_request(field: &str, message: String) -> AppError {
    let mut errors = FieldErrors::new();
    errors.insert(field.to_string(), vec![message]);
    AppError::Tag(TagError::BadRequestData(errors))
}

/// Unreadable bodies land under `_schema`, like any other malformed payload.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        bad_request("_schema", rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        bad_request("id", rejection.body_text())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message, field_errors) = match self {
            AppError::Tag(err) => {
                let status = match &err {
                    TagError::BadRequestData(_) | TagError::Validation(_) => {
                        StatusCode::BAD_REQUEST
                    }
                    TagError::NotFound(_) => StatusCode::NOT_FOUND,
                    TagError::PermissionDenied(_) => StatusCode::FORBIDDEN,
                    TagError::Conflict(_) => StatusCode::CONFLICT,
                    TagError::StorageConnection(_)
                    | TagError::Database(_)
                    | TagError::DataIntegrity(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status.is_server_error() {
                    // Log the original error for debugging purposes
                    error!("TagError: {:?}", err);
                } else {
                    warn!("Rejected request: {}", err);
                }
                match err {
                    TagError::BadRequestData(fields) => {
                        (status, "Invalid request data.".to_string(), Some(fields))
                    }
                    TagError::Validation(msg)
                    | TagError::NotFound(msg)
                    | TagError::PermissionDenied(msg)
                    | TagError::Conflict(msg) => (status, msg, None),
                    TagError::StorageConnection(_) => (
                        status,
                        "Storage provider connection error.".to_string(),
                        None,
                    ),
                    TagError::Database(_) | TagError::DataIntegrity(_) => (
                        status,
                        "An internal server error occurred.".to_string(),
                        None,
                    ),
                }
            }
            AppError::Access(err) => {
                error!("CoreAccessError: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Could not resolve the current user.".to_string(),
                    None,
                )
            }
            AppError::Internal(err) => {
                error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.".to_string(),
                    None,
                )
            }
        };

        let body = match field_errors {
            Some(errors) => json!({ "error": error_message, "errors": errors }),
            None => json!({ "error": error_message }),
        };

        (status_code, Json(body)).into_response()
    }
}
