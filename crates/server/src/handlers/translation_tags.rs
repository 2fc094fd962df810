//! # Translation Tag Handlers
//!
//! CRUD and review endpoints for tags attached to whole verse translations.

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
use versetag::{TagFilters, TranslationTag};

/// Handler for `GET /tags/translation`.
pub async fn list_translation_tags_handler(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(filters): Query<TagFilters>,
    debug_params: Query<DebugParams>,
) -> ApiResult<Vec<TranslationTag>> {
    let tags = app_state.translation_tags.list(&filters).await?;
    let debug_info = json!({ "filters": filters, "count": tags.len() });
    Ok(wrap_response(
        tags,
        "Successfully fetched translation tags",
        StatusCode::OK,
        debug_params,
        Some(debug_info),
    ))
}

/// Handler for `POST /tags/translation` with `{verse_id, translationtags: [...]}`.
pub async fn create_translation_tags_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    debug_params: Query<DebugParams>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Vec<TranslationTag>> {
    let Json(payload) = payload?;
    let tagger = user.0;
    info!(user_id = %tagger.id, "Received translation tag batch.");
    let tags = app_state.translation_tags.create(&tagger, &payload).await?;
    let debug_info = json!({ "tagger": tagger.id, "count": tags.len() });
    Ok(wrap_response(
        tags,
        "Successfully added translation tags",
        StatusCode::CREATED,
        debug_params,
        Some(debug_info),
    ))
}

/// Handler for `DELETE /tags/translation/{id}`.
pub async fn delete_translation_tag_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    id: Result<Path<i64>, PathRejection>,
    debug_params: Query<DebugParams>,
) -> ApiResult<Value> {
    let Path(id) = id?;
    info!(user_id = %user.0.id, tag_id = id, "Deleting translation tag.");
    app_state.translation_tags.delete(id).await?;
    Ok(wrap_response(
        json!({}),
        "Successfully deleted translation tag",
        StatusCode::OK,
        debug_params,
        None,
    ))
}

/// Handler for `PUT /tags/translation/{id}`: marks the tag reviewed by the caller.
pub async fn review_translation_tag_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    id: Result<Path<i64>, PathRejection>,
    debug_params: Query<DebugParams>,
) -> ApiResult<TranslationTag> {
    let Path(id) = id?;
    let tag = app_state.translation_tags.review(&user.0, id).await?;
    Ok(wrap_response(
        tag,
        "Successfully reviewed translation tag",
        StatusCode::OK,
        debug_params,
        None,
    ))
}
