//! # Data Model
//!
//! Records stored by `versetag` and the decoded forms of incoming payloads.

use crate::{
    errors::TagError,
    providers::db::sqlite::{opt_int, opt_text},
};
use serde::{Deserialize, Serialize};
use turso::Row;

/// An immutable reference record for one scripture passage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verse {
    /// Human-readable locator, e.g. `1.1.1`.
    pub verse_id: String,
    pub canto_num: i64,
    pub chapter_num: i64,
    pub verse_num: i64,
    #[serde(default)]
    pub verse_num_end: Option<i64>,
    pub verse: String,
    pub synonyms: String,
    pub devanagari: String,
    pub translation: String,
    #[serde(default)]
    pub purport: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl Verse {
    /// Reads the twelve `sql::VERSE_COLUMNS` starting at `offset`.
    pub(crate) fn from_row(row: &Row, offset: usize) -> Result<Self, TagError> {
        Ok(Verse {
            verse_id: row.get(offset)?,
            canto_num: row.get(offset + 1)?,
            chapter_num: row.get(offset + 2)?,
            verse_num: row.get(offset + 3)?,
            verse_num_end: opt_int(row, offset + 4)?,
            verse: row.get(offset + 5)?,
            synonyms: row.get(offset + 6)?,
            devanagari: row.get(offset + 7)?,
            translation: row.get(offset + 8)?,
            purport: opt_text(row, offset + 9)?,
            context: opt_text(row, offset + 10)?,
            title: opt_text(row, offset + 11)?,
        })
    }

    /// Length of the purport in characters; ranges index characters, not bytes.
    pub fn purport_len(&self) -> Option<usize> {
        self.purport.as_ref().map(|p| p.chars().count())
    }
}

/// A node of the tag taxonomy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    /// Depth in the hierarchy; roots are level 1.
    pub level: i64,
    pub parent_id: Option<i64>,
    pub is_leaf: bool,
}

impl TryFrom<&Row> for Tag {
    type Error = TagError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        let is_leaf: i64 = row.get(4)?;
        Ok(Tag {
            id: row.get(0)?,
            name: row.get(1)?,
            level: row.get(2)?,
            parent_id: opt_int(row, 3)?,
            is_leaf: is_leaf != 0,
        })
    }
}

/// Input for creating a tag.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTag {
    pub name: String,
    #[serde(default = "default_level")]
    pub level: i64,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub is_leaf: bool,
}

fn default_level() -> i64 {
    1
}

/// A tag attached to a whole verse translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationTag {
    pub id: i64,
    pub verse: Verse,
    pub tag_name: String,
    pub tagger: Option<String>,
    pub tagger_remark: Option<String>,
    pub reviewer: Option<String>,
}

/// A tag attached to the character range `[start_idx, end_idx)` of a purport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurportSectionTag {
    pub id: i64,
    pub verse: Verse,
    pub tag_name: String,
    pub start_idx: i64,
    pub end_idx: i64,
    pub tagger: Option<String>,
    pub tagger_remark: Option<String>,
    pub reviewer: Option<String>,
}

/// A proposal to add a new tag under an existing parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagRequest {
    pub verse_id: String,
    pub name: String,
    pub parent: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub initiator: Option<String>,
    #[serde(default)]
    pub approver: Option<String>,
}

/// Optional exact-match filters for listing tag assignments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagFilters {
    #[serde(default)]
    pub canto_num: Option<i64>,
    #[serde(default)]
    pub chapter_num: Option<i64>,
    #[serde(default)]
    pub verse_id: Option<String>,
}

/// A validated translation-tag entry from a create batch.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationTagEntry {
    pub tag: String,
    /// Disambiguates a tag name that exists at several levels.
    pub level: Option<i64>,
    pub tagger_remark: Option<String>,
}

/// A validated purport-section entry from a create batch.
#[derive(Debug, Clone, PartialEq)]
pub struct PurportTagEntry {
    pub tag: String,
    pub level: Option<i64>,
    pub start_idx: i64,
    pub end_idx: i64,
    pub tagger_remark: Option<String>,
}
