//! # Purport Section Tag Handlers
//!
//! CRUD and review endpoints for tags attached to character ranges of a purport.

use super::{wrap_response, ApiResult, AppState, DebugParams};
use crate::auth::middleware::AuthenticatedUser;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::info;
use versetag::{PurportSectionTag, TagFilters};

/// Handler for `GET /tags/purport`.
pub async fn list_purport_tags_handler(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(filters): Query<TagFilters>,
    debug_params: Query<DebugParams>,
) -> ApiResult<Vec<PurportSectionTag>> {
    let tags = app_state.purport_tags.list(&filters).await?;
    let debug_info = json!({ "filters": filters, "count": tags.len() });
    Ok(wrap_response(
        tags,
        "Successfully fetched purport tags",
        StatusCode::OK,
        debug_params,
        Some(debug_info),
    ))
}

/// Handler for `POST /tags/purport` with `{verse_id, purporttags: [...]}`.
pub async fn create_purport_tags_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    debug_params: Query<DebugParams>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Vec<PurportSectionTag>> {
    let Json(payload) = payload?;
    let tagger = user.0;
    info!(user_id = %tagger.id, "Received purport tag batch.");
    let tags = app_state.purport_tags.create(&tagger, &payload).await?;
    let debug_info = json!({ "tagger": tagger.id, "count": tags.len() });
    Ok(wrap_response(
        tags,
        "Successfully added purport tags",
        StatusCode::CREATED,
        debug_params,
        Some(debug_info),
    ))
}

pub async fn delete_purport_tag_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    id: Result<Path<i64>, PathRejection>,
    debug_params: Query<DebugParams>,
) -> ApiResult<Value> {
    let Path(id) = id?;
    info!(user_id = %user.0.id, tag_id = id, "Deleting purport section tag.");
    app_state.purport_tags.delete(id).await?;
    Ok(wrap_response(
        json!({}),
        "Successfully deleted purport tag",
        StatusCode::OK,
        debug_params,
        None,
    ))
}

/// Handler for `PUT /tags/purport/{id}`: marks the tag reviewed by the caller.
pub async fn review_purport_tag_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    id: Result<Path<i64>, PathRejection>,
    debug_params: Query<DebugParams>,
) -> ApiResult<PurportSectionTag> {
    let Path(id) = id?;
    let tag = app_state.purport_tags.review(&user.0, id).await?;
    Ok(wrap_response(
        tag,
        "Successfully reviewed purport tag",
        StatusCode::OK,
        debug_params,
        None,
    ))
}
