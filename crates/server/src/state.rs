//! # Application State
//!
//! The shared application state (`AppState`) and the logic for building it at
//! startup. It holds the configuration, the database provider and the tagging
//! services, making them accessible to all request handlers.

use crate::config::AppConfig;
use std::sync::Arc;
use tracing::info;
use versetag::{PurportSectionTagService, SqliteProvider, TranslationTagService};

/// The shared application state, accessible from all request handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// The application's configuration.
    pub config: Arc<AppConfig>,
    /// The database provider for tags, verses and users.
    pub sqlite_provider: Arc<SqliteProvider>,
    pub translation_tags: Arc<TranslationTagService>,
    pub purport_tags: Arc<PurportSectionTagService>,
}

/// Builds the shared application state from the configuration.
///
/// Opens the SQLite database at `db_url`, brings its schema up to date and
/// wires the tagging services to it.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let sqlite_provider = SqliteProvider::new(&config.db_url).await?;
    info!(db_path = %config.db_url, "Initialized local storage provider (SQLite).");
    // Ensure the database schema is up-to-date on startup.
    sqlite_provider.initialize_schema().await?;

    let translation_tags = TranslationTagService::new(sqlite_provider.clone());
    let purport_tags = PurportSectionTagService::new(sqlite_provider.clone());

    Ok(AppState {
        config: Arc::new(config),
        sqlite_provider: Arc::new(sqlite_provider),
        translation_tags: Arc::new(translation_tags),
        purport_tags: Arc::new(purport_tags),
    })
}
