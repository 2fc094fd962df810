//! # Verse Reference Data
//!
//! Verses are written once by an import and read by the tagging services.

use crate::{
    errors::{map_constraint_error, TagError},
    providers::db::sqlite::{nullable, sql::VERSE_COLUMNS},
    types::Verse,
};
use tracing::debug;
use turso::{params, Connection};

/// Imports a verse. A second import of the same `verse_id` fails with `Conflict`.
pub async fn insert_verse(conn: &Connection, verse: &Verse) -> Result<(), TagError> {
    conn.execute(
        "INSERT INTO verses (verse_id, canto_num, chapter_num, verse_num, verse_num_end, verse, synonyms, devanagari, translation, purport, context, title)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            verse.verse_id.clone(),
            verse.canto_num,
            verse.chapter_num,
            verse.verse_num,
            nullable(verse.verse_num_end),
            verse.verse.clone(),
            verse.synonyms.clone(),
            verse.devanagari.clone(),
            verse.translation.clone(),
            nullable(verse.purport.clone()),
            nullable(verse.context.clone()),
            nullable(verse.title.clone())
        ],
    )
    .await
    .map_err(|e| map_constraint_error(e, &format!("Verse '{}'", verse.verse_id)))?;
    debug!(verse_id = %verse.verse_id, "Imported verse.");
    Ok(())
}

pub async fn get_verse(conn: &Connection, verse_id: &str) -> Result<Option<Verse>, TagError> {
    let mut rows = conn
        .query(
            &format!("SELECT {VERSE_COLUMNS} FROM verses v WHERE v.verse_id = ?"),
            params![verse_id],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(Verse::from_row(&row, 0)?)),
        None => Ok(None),
    }
}
