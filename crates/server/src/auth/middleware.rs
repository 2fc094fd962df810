//! # Authentication Middleware
//!
//! This module provides the Axum extractor for JWT-based authentication.
//! `AuthenticatedUser` rejects any request without a valid bearer token, so
//! handlers that take it always run on behalf of a known, stored user.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use core_access::{get_or_create_user, User};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, warn};

use crate::state::AppState;

/// Represents the claims we expect to find in the JWT.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The subject of the token, which we use as the unique user identifier.
    pub sub: String,
    /// The expiration timestamp.
    pub exp: usize,
}

/// An Axum extractor that provides the currently authenticated user.
///
/// 1.  **No Token Present**: `401 Unauthorized`.
/// 2.  **Invalid/Expired Token Present**: `401 Unauthorized`.
/// 3.  **Valid Token Present**: the stored user for the token subject, created
///     with the tagger role on first sight.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

/// A custom rejection type for authentication failures.
///
/// This allows the `FromRequestParts` implementation to return a specific
/// HTTP status code and error message, which Axum then turns into a response.
pub struct AuthError(StatusCode, String);

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "error": self.1 }))).into_response()
    }
}

fn unauthorized(message: &str) -> AuthError {
    AuthError(StatusCode::UNAUTHORIZED, message.to_string())
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let bearer_header =
            Option::<TypedHeader<Authorization<Bearer>>>::from_request_parts(parts, state)
                .await
                .map_err(|e| {
                    warn!("Unexpected error during header extraction: {}", e);
                    AuthError(
                        StatusCode::BAD_REQUEST,
                        "Invalid Authorization header format.".to_string(),
                    )
                })?;

        let Some(TypedHeader(Authorization(bearer))) = bearer_header else {
            warn!("Rejected request without an Authorization header.");
            return Err(unauthorized("Authentication credentials were not provided."));
        };

        // `Validation::default()` checks `exp` for HS256 tokens.
        let token_data = decode::<Claims>(
            bearer.token(),
            &DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| {
            warn!("JWT validation failed: {}", e);
            unauthorized("Invalid or expired token.")
        })?;
        debug!(sub = %token_data.claims.sub, "Validated bearer token.");

        let user = get_or_create_user(&state.sqlite_provider.db, &token_data.claims.sub)
            .await
            .map_err(|e| {
                // This is an internal error because the DB should be available.
                error!("Failed to get or create user: {}", e);
                AuthError(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Could not retrieve user.".to_string(),
                )
            })?;

        Ok(AuthenticatedUser(user))
    }
}
