//! # Tag Assignment Services
//!
//! Two kinds of assignment share one lifecycle: a tagger creates it, a
//! reviewer marks it reviewed, and a tagger may delete it. A second create for
//! the same key merges into the existing row by overwriting its remark.
//!
//! Batch creates are atomic: every entry of a batch is written inside one
//! transaction, and a failing entry rolls back the entries before it.

pub mod purport;
pub mod translation;

pub use purport::PurportSectionTagService;
pub use translation::TranslationTagService;

use crate::{errors::TagError, types::Verse, verses::get_verse};
use core_access::User;
use tracing::{error, warn};
use turso::Connection;

/// Message returned when Delete/Review targets an unknown assignment.
pub const INVALID_TAG_ID: &str = "Not a valid tag_id";
/// Message returned when a duplicate assignment carries no remark to merge.
pub const DB_INTEGRITY_ERROR: &str = "DB Integrity error";

pub(crate) async fn begin(conn: &Connection) -> Result<(), TagError> {
    conn.execute("BEGIN TRANSACTION", ()).await?;
    Ok(())
}

/// Commits on success and rolls back on failure, returning the original result.
pub(crate) async fn finish<T>(
    conn: &Connection,
    result: Result<T, TagError>,
) -> Result<T, TagError> {
    match result {
        Ok(value) => {
            conn.execute("COMMIT", ()).await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = conn.execute("ROLLBACK", ()).await {
                error!("Rollback failed after '{e}': {rollback_err}");
            }
            Err(e)
        }
    }
}

pub(crate) async fn resolve_verse(conn: &Connection, verse_id: &str) -> Result<Verse, TagError> {
    get_verse(conn, verse_id)
        .await?
        .ok_or_else(|| TagError::Validation(format!("Verse '{verse_id}' does not exist")))
}

/// Review is reserved for reviewers; checked before the target is looked up.
pub(crate) fn require_reviewer(user: &User) -> Result<(), TagError> {
    if user.is_reviewer() {
        Ok(())
    } else {
        warn!(user_id = %user.id, role = user.role, "Rejected review by non-reviewer.");
        Err(TagError::PermissionDenied(
            "Only reviewers are allowed to update".to_string(),
        ))
    }
}
