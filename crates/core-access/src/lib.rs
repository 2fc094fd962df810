//! # Core Access Crate
//!
//! This crate is the central authority for user identity and role lookups in
//! `versetag`. Token verification happens in the server; once a token subject is
//! known, this crate maps it to a persisted `User` carrying a role code.

/// Role code given to every user on first sight. Taggers may create and delete
/// tag assignments.
pub const TAGGER_ROLE: i64 = 1;
/// Role code of reviewers, the only users allowed to mark assignments as reviewed.
pub const REVIEWER_ROLE: i64 = 3;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use turso::{Database, Error as TursoError, Row, params};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum CoreAccessError {
    #[error("Database error: {0}")]
    Database(#[from] TursoError),
    #[error("Failed to create or find user for identifier: {0}")]
    UserPersistenceFailed(String),
    #[error("Unknown user: {0}")]
    UnknownUser(String),
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),
}

/// Represents a user in the system.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    /// The unique, deterministic ID of the user (UUIDv5 from the token subject).
    pub id: String,
    /// The user's role code (`TAGGER_ROLE`, `REVIEWER_ROLE`, ...).
    pub role: i64,
    /// The timestamp when the user was first created.
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_reviewer(&self) -> bool {
        self.role == REVIEWER_ROLE
    }
}

impl TryFrom<&Row> for User {
    type Error = CoreAccessError;

    fn try_from(row: &Row) -> std::result::Result<Self, Self::Error> {
        let created_at_str: String = row.get(2)?;
        let created_at =
            chrono::NaiveDateTime::parse_from_str(&created_at_str, "%Y-%m-%d %H:%M:%S")
                .map(|ndt| DateTime::<Utc>::from_naive_utc_and_offset(ndt, Utc))
                .map_err(|e| {
                    CoreAccessError::DataIntegrity(format!(
                        "Failed to parse date '{created_at_str}': {e}"
                    ))
                })?;

        Ok(User {
            id: row.get(0)?,
            role: row.get(1)?,
            created_at,
        })
    }
}

/// Derives the stored user id from an external identifier (e.g. a token `sub`).
pub fn user_id_for(user_identifier: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, user_identifier.as_bytes()).to_string()
}

async fn find_user(db: &Database, user_id: &str) -> Result<Option<User>, CoreAccessError> {
    let conn = db.connect()?;
    let mut rows = conn
        .query(
            "SELECT id, role, created_at FROM users WHERE id = ?",
            params![user_id],
        )
        .await?;

    match rows.next().await? {
        Some(row) => Ok(Some(User::try_from(&row)?)),
        None => Ok(None),
    }
}

/// Finds a user by their unique identifier (e.g., email or token sub),
/// creating them with the tagger role if they don't exist.
///
/// The primary key is a deterministic UUIDv5 of the identifier, so repeated
/// calls are idempotent.
pub async fn get_or_create_user(
    db: &Database,
    user_identifier: &str,
) -> Result<User, CoreAccessError> {
    let user_id = user_id_for(user_identifier);

    if let Some(user) = find_user(db, &user_id).await? {
        return Ok(user);
    }

    let conn = db.connect()?;
    conn.execute(
        "INSERT INTO users (id, role) VALUES (?, ?)",
        params![user_id.clone(), TAGGER_ROLE],
    )
    .await?;
    info!(user_id = %user_id, "Registered new user with the tagger role.");

    // Read back to pick up `created_at`.
    find_user(db, &user_id)
        .await?
        .ok_or_else(|| CoreAccessError::UserPersistenceFailed(user_identifier.to_string()))
}

/// Changes the role code of an existing user.
pub async fn set_user_role(
    db: &Database,
    user_id: &str,
    role: i64,
) -> Result<User, CoreAccessError> {
    let conn = db.connect()?;
    let changed = conn
        .execute(
            "UPDATE users SET role = ? WHERE id = ?",
            params![role, user_id],
        )
        .await?;
    if changed == 0 {
        return Err(CoreAccessError::UnknownUser(user_id.to_string()));
    }
    info!(user_id = %user_id, role, "Updated user role.");

    find_user(db, user_id)
        .await?
        .ok_or_else(|| CoreAccessError::UnknownUser(user_id.to_string()))
}
