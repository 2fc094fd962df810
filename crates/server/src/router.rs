use super::{handlers, state::AppState};
use axum::{
    routing::{get, put},
    Router,
};
use tower_http::trace::TraceLayer;

/// Creates the Axum router with all the application routes.
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/me", get(handlers::me_handler))
        .route("/tags", get(handlers::get_tag_tree_handler))
        .route(
            "/tags/translation",
            get(handlers::list_translation_tags_handler)
                .post(handlers::create_translation_tags_handler),
        )
        .route(
            "/tags/translation/{id}",
            put(handlers::review_translation_tag_handler)
                .delete(handlers::delete_translation_tag_handler),
        )
        .route(
            "/tags/purport",
            get(handlers::list_purport_tags_handler).post(handlers::create_purport_tags_handler),
        )
        .route(
            "/tags/purport/{id}",
            put(handlers::review_purport_tag_handler).delete(handlers::delete_purport_tag_handler),
        )
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
}
