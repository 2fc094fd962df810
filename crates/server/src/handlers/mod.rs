//! # API Route Handlers
//!
//! This module organizes all the Axum route handlers for the `versetag-server`.
//! The handlers are split into sub-modules by resource.

pub mod general;
pub mod purport_tags;
pub mod tags;
pub mod translation_tags;

// Re-export all handlers from the sub-modules to make them easily accessible
// to the router under a single `handlers::` path.
pub use general::*;
pub use purport_tags::*;
pub use tags::*;
pub use translation_tags::*;

// Shared items used by multiple handler modules.
use super::{
    errors::AppError,
    state::AppState,
    types::{ApiResponse, DebugParams},
};
use axum::{extract::Query, http::StatusCode, Json};
use serde_json::Value;

/// The `(status, envelope)` pair every successful handler returns.
pub type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), AppError>;

/// A shared helper function to wrap a successful result in the standard `ApiResponse`
/// format, optionally including debug information if requested.
pub(crate) fn wrap_response<T>(
    result: T,
    message: &str,
    status: StatusCode,
    debug_params: Query<DebugParams>,
    debug_info: Option<Value>,
) -> (StatusCode, Json<ApiResponse<T>>) {
    let debug = if debug_params.debug.unwrap_or(false) {
        debug_info
    } else {
        None
    };
    (
        status,
        Json(ApiResponse {
            message: message.to_string(),
            code: status.as_u16(),
            result,
            debug,
        }),
    )
}
