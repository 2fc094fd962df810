use std::collections::BTreeMap;
use thiserror::Error;

/// Field-level validation messages, keyed by the (possibly nested) field path.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Custom error types for the tagging library.
#[derive(Error, Debug)]
pub enum TagError {
    /// The payload failed structural validation. Carries per-field messages.
    #[error("Invalid request data: {}", summarize(.0))]
    BadRequestData(FieldErrors),
    /// A domain-level failure: unknown tag or verse, a bad range, or a
    /// constraint violation with no remark to fall back to.
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    /// A uniqueness constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Storage connection error: {0}")]
    StorageConnection(String),
    #[error("Database error: {0}")]
    Database(#[from] turso::Error),
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),
}

fn summarize(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Maps a failed write to `Conflict` when the store reports a uniqueness violation.
pub(crate) fn map_constraint_error(err: turso::Error, what: &str) -> TagError {
    match err {
        turso::Error::SqlExecutionFailure(msg) if msg.contains("UNIQUE constraint failed") => {
            TagError::Conflict(format!("{what} already exists"))
        }
        other => TagError::Database(other),
    }
}
