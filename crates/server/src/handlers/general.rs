//! # General Route Handlers
//!
//! Liveness endpoints and the current-user lookup.

use super::{wrap_response, ApiResult, DebugParams};
use crate::{auth::middleware::AuthenticatedUser, types::MeResponse};
use axum::{extract::Query, http::StatusCode};

/// The handler for the root (`/`) endpoint.
pub async fn root() -> &'static str {
    "versetag server is running."
}

/// The handler for the health check (`/health`) endpoint.
pub async fn health_check() -> &'static str {
    "OK"
}

/// Returns the identity and role the bearer token resolves to.
pub async fn me_handler(
    user: AuthenticatedUser,
    debug_params: Query<DebugParams>,
) -> ApiResult<MeResponse> {
    let current_user = user.0;
    let response = MeResponse {
        is_reviewer: current_user.is_reviewer(),
        id: current_user.id,
        role: current_user.role,
    };
    Ok(wrap_response(
        response,
        "Successfully fetched current user",
        StatusCode::OK,
        debug_params,
        None,
    ))
}
