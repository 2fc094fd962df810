use super::{wrap_response, ApiResult, AppState, DebugParams};
use crate::auth::middleware::AuthenticatedUser;
use axum::{
    extract::{Query, State},
    http::StatusCode,
};
use serde_json::json;
use tracing::info;
use versetag::{taxonomy, TagTree};

/// Handler for `GET /tags`: the whole taxonomy as a nested name mapping.
pub async fn get_tag_tree_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    debug_params: Query<DebugParams>,
) -> ApiResult<TagTree> {
    info!(user_id = %user.0.id, "Fetching tag tree.");
    let conn = app_state.sqlite_provider.connect()?;
    let tree = taxonomy::get_tag_tree(&conn).await?;

    let debug_info = json!({ "root_count": tree.0.len() });
    Ok(wrap_response(
        tree,
        "Successfully fetched all tags",
        StatusCode::OK,
        debug_params,
        Some(debug_info),
    ))
}
