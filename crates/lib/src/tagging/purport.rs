//! Tags attached to a character range of a verse's purport.
//! One row per (verse, tag, start_idx, end_idx).

use super::{begin, finish, require_reviewer, resolve_verse, DB_INTEGRITY_ERROR, INVALID_TAG_ID};
use crate::{
    errors::{map_constraint_error, TagError},
    providers::db::sqlite::{nullable, opt_text, sql, SqliteProvider},
    schema::{self, EntrySchema},
    taxonomy::find_tag_by_name,
    types::{PurportSectionTag, PurportTagEntry, TagFilters, Verse},
};
use core_access::User;
use serde_json::Value;
use std::fmt;
use tracing::{debug, info};
use turso::{params, Connection, Row};

/// Key of the entry list in a create payload.
pub const ENTRIES_KEY: &str = "purporttags";

impl TryFrom<&Row> for PurportSectionTag {
    type Error = TagError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(PurportSectionTag {
            id: row.get(0)?,
            tag_name: row.get(1)?,
            start_idx: row.get(2)?,
            end_idx: row.get(3)?,
            tagger: opt_text(row, 4)?,
            tagger_remark: opt_text(row, 5)?,
            reviewer: opt_text(row, 6)?,
            verse: Verse::from_row(row, 7)?,
        })
    }
}

#[derive(Clone)]
pub struct PurportSectionTagService {
    provider: SqliteProvider,
    schema: EntrySchema<PurportTagEntry>,
}

impl fmt::Debug for PurportSectionTagService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PurportSectionTagService")
            .finish_non_exhaustive()
    }
}

impl PurportSectionTagService {
    pub fn new(provider: SqliteProvider) -> Self {
        Self::with_schema(provider, schema::purport_tag_entry)
    }

    pub fn with_schema(provider: SqliteProvider, schema: EntrySchema<PurportTagEntry>) -> Self {
        Self { provider, schema }
    }

    /// Lists purport section tags matching the filters, ordered by `start_idx`.
    pub async fn list(&self, filters: &TagFilters) -> Result<Vec<PurportSectionTag>, TagError> {
        let clause = filters.to_clause();
        let query = format!(
            "{}{} ORDER BY pt.start_idx, pt.id",
            sql::select_purport_section_tags(),
            clause.sql
        );
        debug!(query = %query, "Listing purport section tags.");

        let conn = self.provider.connect()?;
        let mut rows = conn.query(&query, clause.params).await?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next().await? {
            tags.push(PurportSectionTag::try_from(&row)?);
        }
        Ok(tags)
    }

    pub async fn get(&self, id: i64) -> Result<Option<PurportSectionTag>, TagError> {
        let conn = self.provider.connect()?;
        fetch(&conn, id).await
    }

    /// Handles a create payload `{verse_id, purporttags: [...]}`.
    pub async fn create(
        &self,
        tagger: &User,
        payload: &Value,
    ) -> Result<Vec<PurportSectionTag>, TagError> {
        let batch =
            schema::batch_payload(payload, ENTRIES_KEY).map_err(TagError::BadRequestData)?;
        self.create_entries(tagger, &batch.verse_id, &batch.entries)
            .await
    }

    /// Validates every entry, then creates or merges them in one transaction.
    pub async fn create_entries(
        &self,
        tagger: &User,
        verse_id: &str,
        entries: &[Value],
    ) -> Result<Vec<PurportSectionTag>, TagError> {
        let entries = schema::validate_entries(entries, ENTRIES_KEY, self.schema)?;
        if entries.is_empty() {
            debug!(verse_id = %verse_id, "Empty purport section tag batch, nothing to store.");
            return Ok(Vec::new());
        }

        let conn = self.provider.connect()?;
        begin(&conn).await?;
        let result = create_in_transaction(&conn, tagger, verse_id, &entries).await;
        let created = finish(&conn, result).await?;

        info!(
            verse_id = %verse_id,
            tagger = %tagger.id,
            "Stored {} purport section tags.",
            created.len()
        );
        Ok(created)
    }

    pub async fn delete(&self, id: i64) -> Result<(), TagError> {
        let conn = self.provider.connect()?;
        let deleted = conn
            .execute("DELETE FROM purport_section_tags WHERE id = ?", params![id])
            .await?;
        if deleted == 0 {
            return Err(TagError::NotFound(INVALID_TAG_ID.to_string()));
        }
        info!(tag_id = id, "Deleted purport section tag.");
        Ok(())
    }

    pub async fn review(&self, reviewer: &User, id: i64) -> Result<PurportSectionTag, TagError> {
        require_reviewer(reviewer)?;

        let conn = self.provider.connect()?;
        let updated = conn
            .execute(
                "UPDATE purport_section_tags SET reviewer = ? WHERE id = ?",
                params![reviewer.id.clone(), id],
            )
            .await?;
        if updated == 0 {
            return Err(TagError::NotFound(INVALID_TAG_ID.to_string()));
        }
        info!(tag_id = id, reviewer = %reviewer.id, "Reviewed purport section tag.");

        fetch(&conn, id)
            .await?
            .ok_or_else(|| TagError::NotFound(INVALID_TAG_ID.to_string()))
    }
}

async fn fetch(conn: &Connection, id: i64) -> Result<Option<PurportSectionTag>, TagError> {
    let query = format!("{} WHERE pt.id = ?", sql::select_purport_section_tags());
    let mut rows = conn.query(&query, params![id]).await?;
    match rows.next().await? {
        Some(row) => Ok(Some(PurportSectionTag::try_from(&row)?)),
        None => Ok(None),
    }
}

/// The range must fall inside the purport text, counted in characters.
fn check_range(verse: &Verse, entry: &PurportTagEntry) -> Result<(), TagError> {
    let Some(len) = verse.purport_len() else {
        return Err(TagError::Validation(format!(
            "Verse '{}' has no purport to tag",
            verse.verse_id
        )));
    };
    if entry.end_idx > len as i64 {
        return Err(TagError::Validation(format!(
            "Range [{}, {}) exceeds the purport length {len} of verse '{}'",
            entry.start_idx, entry.end_idx, verse.verse_id
        )));
    }
    Ok(())
}

async fn create_in_transaction(
    conn: &Connection,
    tagger: &User,
    verse_id: &str,
    entries: &[PurportTagEntry],
) -> Result<Vec<PurportSectionTag>, TagError> {
    let verse = resolve_verse(conn, verse_id).await?;
    let mut stored = Vec::with_capacity(entries.len());

    for entry in entries {
        check_range(&verse, entry)?;
        let tag = find_tag_by_name(conn, &entry.tag, entry.level).await?;

        let mut existing = conn
            .query(
                "SELECT id FROM purport_section_tags
                 WHERE verse_id = ? AND tag_id = ? AND start_idx = ? AND end_idx = ?",
                params![verse.verse_id.clone(), tag.id, entry.start_idx, entry.end_idx],
            )
            .await?;
        let existing_id: Option<i64> = match existing.next().await? {
            Some(row) => Some(row.get(0)?),
            None => None,
        };
        drop(existing);

        let id = match (existing_id, &entry.tagger_remark) {
            (Some(id), Some(remark)) => {
                conn.execute(
                    "UPDATE purport_section_tags SET tagger_remark = ? WHERE id = ?",
                    params![remark.clone(), id],
                )
                .await?;
                debug!(tag_id = id, "Merged duplicate purport section tag into remark update.");
                id
            }
            (Some(_), None) => return Err(TagError::Validation(DB_INTEGRITY_ERROR.to_string())),
            (None, _) => {
                let what = format!(
                    "Purport section tag '{}' on verse '{}' [{}, {})",
                    tag.name, verse.verse_id, entry.start_idx, entry.end_idx
                );
                let mut rows = conn
                    .query(
                        "INSERT INTO purport_section_tags (verse_id, tag_id, start_idx, end_idx, tagger, tagger_remark)
                         VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
                        params![
                            verse.verse_id.clone(),
                            tag.id,
                            entry.start_idx,
                            entry.end_idx,
                            tagger.id.clone(),
                            nullable(entry.tagger_remark.clone())
                        ],
                    )
                    .await
                    .map_err(|e| map_constraint_error(e, &what))?;
                match rows.next().await.map_err(|e| map_constraint_error(e, &what))? {
                    Some(row) => row.get(0)?,
                    None => {
                        return Err(TagError::DataIntegrity(format!(
                            "Insert of {what} returned no id"
                        )))
                    }
                }
            }
        };

        let record = fetch(conn, id).await?.ok_or_else(|| {
            TagError::DataIntegrity(format!("Purport section tag {id} vanished after write"))
        })?;
        stored.push(record);
    }

    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verse_with_purport(purport: Option<&str>) -> Verse {
        Verse {
            verse_id: "1.1.1".to_string(),
            canto_num: 1,
            chapter_num: 1,
            verse_num: 1,
            verse_num_end: None,
            verse: String::new(),
            synonyms: String::new(),
            devanagari: String::new(),
            translation: String::new(),
            purport: purport.map(String::from),
            context: None,
            title: None,
        }
    }

    fn entry(start_idx: i64, end_idx: i64) -> PurportTagEntry {
        PurportTagEntry {
            tag: "devotion".to_string(),
            level: None,
            start_idx,
            end_idx,
            tagger_remark: None,
        }
    }

    #[test]
    fn range_is_measured_in_characters() {
        // Five characters, more than five bytes.
        let verse = verse_with_purport(Some("kṛṣṇa"));
        assert!(check_range(&verse, &entry(0, 5)).is_ok());
        assert!(matches!(
            check_range(&verse, &entry(2, 6)),
            Err(TagError::Validation(_))
        ));
    }

    #[test]
    fn verse_without_purport_rejects_ranges() {
        let verse = verse_with_purport(None);
        assert!(matches!(
            check_range(&verse, &entry(0, 1)),
            Err(TagError::Validation(_))
        ));
    }
}
