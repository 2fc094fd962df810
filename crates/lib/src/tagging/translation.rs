//! Tags attached to a whole verse translation. One row per (verse, tag).

use super::{begin, finish, require_reviewer, resolve_verse, DB_INTEGRITY_ERROR, INVALID_TAG_ID};
use crate::{
    errors::{map_constraint_error, TagError},
    providers::db::sqlite::{nullable, opt_text, sql, SqliteProvider},
    schema::{self, EntrySchema},
    taxonomy::find_tag_by_name,
    types::{TagFilters, TranslationTag, TranslationTagEntry, Verse},
};
use core_access::User;
use serde_json::Value;
use std::fmt;
use tracing::{debug, info};
use turso::{params, Connection, Row};

/// Key of the entry list in a create payload.
pub const ENTRIES_KEY: &str = "translationtags";

impl TryFrom<&Row> for TranslationTag {
    type Error = TagError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(TranslationTag {
            id: row.get(0)?,
            tag_name: row.get(1)?,
            tagger: opt_text(row, 2)?,
            tagger_remark: opt_text(row, 3)?,
            reviewer: opt_text(row, 4)?,
            verse: Verse::from_row(row, 5)?,
        })
    }
}

#[derive(Clone)]
pub struct TranslationTagService {
    provider: SqliteProvider,
    schema: EntrySchema<TranslationTagEntry>,
}

impl fmt::Debug for TranslationTagService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationTagService").finish_non_exhaustive()
    }
}

impl TranslationTagService {
    pub fn new(provider: SqliteProvider) -> Self {
        Self::with_schema(provider, schema::translation_tag_entry)
    }

    /// Builds the service with a custom entry schema.
    pub fn with_schema(provider: SqliteProvider, schema: EntrySchema<TranslationTagEntry>) -> Self {
        Self { provider, schema }
    }

    /// Lists translation tags matching the supplied filters, in creation order.
    pub async fn list(&self, filters: &TagFilters) -> Result<Vec<TranslationTag>, TagError> {
        let clause = filters.to_clause();
        let query = format!("{}{} ORDER BY tt.id", sql::select_translation_tags(), clause.sql);
        debug!(query = %query, "Listing translation tags.");

        let conn = self.provider.connect()?;
        let mut rows = conn.query(&query, clause.params).await?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next().await? {
            tags.push(TranslationTag::try_from(&row)?);
        }
        Ok(tags)
    }

    pub async fn get(&self, id: i64) -> Result<Option<TranslationTag>, TagError> {
        let conn = self.provider.connect()?;
        fetch(&conn, id).await
    }

    /// Handles a create payload `{verse_id, translationtags: [...]}`.
    pub async fn create(
        &self,
        tagger: &User,
        payload: &Value,
    ) -> Result<Vec<TranslationTag>, TagError> {
        let batch =
            schema::batch_payload(payload, ENTRIES_KEY).map_err(TagError::BadRequestData)?;
        self.create_entries(tagger, &batch.verse_id, &batch.entries)
            .await
    }

    /// Validates every entry, then creates or merges them in one transaction.
    /// Returns the resulting rows in input order.
    pub async fn create_entries(
        &self,
        tagger: &User,
        verse_id: &str,
        entries: &[Value],
    ) -> Result<Vec<TranslationTag>, TagError> {
        let entries = schema::validate_entries(entries, ENTRIES_KEY, self.schema)?;
        if entries.is_empty() {
            debug!(verse_id = %verse_id, "Empty translation tag batch, nothing to store.");
            return Ok(Vec::new());
        }

        let conn = self.provider.connect()?;
        begin(&conn).await?;
        let result = create_in_transaction(&conn, tagger, verse_id, &entries).await;
        let created = finish(&conn, result).await?;

        info!(
            verse_id = %verse_id,
            tagger = %tagger.id,
            "Stored {} translation tags.",
            created.len()
        );
        Ok(created)
    }

    /// Deletes one translation tag.
    pub async fn delete(&self, id: i64) -> Result<(), TagError> {
        let conn = self.provider.connect()?;
        let deleted = conn
            .execute("DELETE FROM translation_tags WHERE id = ?", params![id])
            .await?;
        if deleted == 0 {
            return Err(TagError::NotFound(INVALID_TAG_ID.to_string()));
        }
        info!(tag_id = id, "Deleted translation tag.");
        Ok(())
    }

    /// Marks a translation tag as reviewed by `reviewer`.
    pub async fn review(&self, reviewer: &User, id: i64) -> Result<TranslationTag, TagError> {
        require_reviewer(reviewer)?;

        let conn = self.provider.connect()?;
        let updated = conn
            .execute(
                "UPDATE translation_tags SET reviewer = ? WHERE id = ?",
                params![reviewer.id.clone(), id],
            )
            .await?;
        if updated == 0 {
            return Err(TagError::NotFound(INVALID_TAG_ID.to_string()));
        }
        info!(tag_id = id, reviewer = %reviewer.id, "Reviewed translation tag.");

        fetch(&conn, id)
            .await?
            .ok_or_else(|| TagError::NotFound(INVALID_TAG_ID.to_string()))
    }
}

async fn fetch(conn: &Connection, id: i64) -> Result<Option<TranslationTag>, TagError> {
    let query = format!("{} WHERE tt.id = ?", sql::select_translation_tags());
    let mut rows = conn.query(&query, params![id]).await?;
    match rows.next().await? {
        Some(row) => Ok(Some(TranslationTag::try_from(&row)?)),
        None => Ok(None),
    }
}

async fn create_in_transaction(
    conn: &Connection,
    tagger: &User,
    verse_id: &str,
    entries: &[TranslationTagEntry],
) -> Result<Vec<TranslationTag>, TagError> {
    let verse = resolve_verse(conn, verse_id).await?;
    let mut stored = Vec::with_capacity(entries.len());

    for entry in entries {
        let tag = find_tag_by_name(conn, &entry.tag, entry.level).await?;

        let mut existing = conn
            .query(
                "SELECT id FROM translation_tags WHERE verse_id = ? AND tag_id = ?",
                params![verse.verse_id.clone(), tag.id],
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
                    "UPDATE translation_tags SET tagger_remark = ? WHERE id = ?",
                    params![remark.clone(), id],
                )
                .await?;
                debug!(tag_id = id, "Merged duplicate translation tag into remark update.");
                id
            }
            (Some(_), None) => return Err(TagError::Validation(DB_INTEGRITY_ERROR.to_string())),
            (None, _) => {
                let what = format!("Translation tag '{}' on verse '{}'", tag.name, verse.verse_id);
                let mut rows = conn
                    .query(
                        "INSERT INTO translation_tags (verse_id, tag_id, tagger, tagger_remark)
                         VALUES (?, ?, ?, ?) RETURNING id",
                        params![
                            verse.verse_id.clone(),
                            tag.id,
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
            TagError::DataIntegrity(format!("Translation tag {id} vanished after write"))
        })?;
        stored.push(record);
    }

    Ok(stored)
}
