//! # SQLite Specific SQL
//!
//! This module centralizes the schema and the query strings used by the
//! tagging services, isolating database-specific syntax from the core logic.

pub const CREATE_USERS_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        role INTEGER NOT NULL DEFAULT 1,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP
    );
";

pub const CREATE_VERSES_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS verses (
        verse_id TEXT PRIMARY KEY,
        canto_num INTEGER NOT NULL,
        chapter_num INTEGER NOT NULL,
        verse_num INTEGER NOT NULL,
        verse_num_end INTEGER,
        verse TEXT NOT NULL,
        synonyms TEXT NOT NULL,
        devanagari TEXT NOT NULL,
        translation TEXT NOT NULL,
        purport TEXT,
        context TEXT,
        title TEXT
    );
";

pub const CREATE_TAGS_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS tags (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        level INTEGER NOT NULL DEFAULT 1,
        parent_id INTEGER,
        is_leaf INTEGER NOT NULL DEFAULT 0,
        UNIQUE (level, name)
    );
";

pub const CREATE_TRANSLATION_TAGS_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS translation_tags (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        verse_id TEXT NOT NULL,
        tag_id INTEGER NOT NULL,
        tagger TEXT,
        tagger_remark TEXT,
        reviewer TEXT,
        UNIQUE (verse_id, tag_id)
    );
";

pub const CREATE_PURPORT_SECTION_TAGS_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS purport_section_tags (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        verse_id TEXT NOT NULL,
        tag_id INTEGER NOT NULL,
        start_idx INTEGER NOT NULL,
        end_idx INTEGER NOT NULL,
        tagger TEXT,
        tagger_remark TEXT,
        reviewer TEXT,
        UNIQUE (verse_id, tag_id, start_idx, end_idx)
    );
";

pub const CREATE_TAG_REQUESTS_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS tag_requests (
        verse_id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        parent TEXT NOT NULL,
        description TEXT,
        initiator TEXT,
        approver TEXT
    );
";

/// Every table, in dependency order. Each statement is idempotent.
pub const ALL_TABLE_CREATION_SQL: &[&str] = &[
    CREATE_USERS_TABLE_SQL,
    CREATE_VERSES_TABLE_SQL,
    CREATE_TAGS_TABLE_SQL,
    CREATE_TRANSLATION_TAGS_TABLE_SQL,
    CREATE_PURPORT_SECTION_TAGS_TABLE_SQL,
    CREATE_TAG_REQUESTS_TABLE_SQL,
];

/// Verse columns in the order `Verse::from_row` reads them, qualified with `v.`.
pub const VERSE_COLUMNS: &str = "v.verse_id, v.canto_num, v.chapter_num, v.verse_num, \
    v.verse_num_end, v.verse, v.synonyms, v.devanagari, v.translation, v.purport, \
    v.context, v.title";

pub const TAG_COLUMNS: &str = "id, name, level, parent_id, is_leaf";

/// Builds the base select for translation tags joined with their verse and tag.
pub fn select_translation_tags() -> String {
    format!(
        "SELECT tt.id, t.name, tt.tagger, tt.tagger_remark, tt.reviewer, {VERSE_COLUMNS}
         FROM translation_tags tt
         JOIN verses v ON v.verse_id = tt.verse_id
         JOIN tags t ON t.id = tt.tag_id"
    )
}

/// Builds the base select for purport section tags joined with their verse and tag.
pub fn select_purport_section_tags() -> String {
    format!(
        "SELECT pt.id, t.name, pt.start_idx, pt.end_idx, pt.tagger, pt.tagger_remark, pt.reviewer, {VERSE_COLUMNS}
         FROM purport_section_tags pt
         JOIN verses v ON v.verse_id = pt.verse_id
         JOIN tags t ON t.id = pt.tag_id"
    )
}
