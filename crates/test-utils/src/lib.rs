use anyhow::Result;
use core_access::{get_or_create_user, set_user_role, User, REVIEWER_ROLE};
use versetag::{
    providers::db::sqlite::SqliteProvider, taxonomy, verses, NewTag, PurportSectionTagService,
    Tag, TranslationTagService, Verse,
};

// --- Test Setup ---

/// A helper struct to manage database creation for each test.
pub struct TestSetup {
    pub provider: SqliteProvider,
}

impl TestSetup {
    /// Creates a new, isolated in-memory database and initializes the schema.
    pub async fn new() -> Result<Self> {
        let provider = SqliteProvider::new(":memory:").await?;
        provider.initialize_schema().await?;
        Ok(Self { provider })
    }

    pub fn translation_tags(&self) -> TranslationTagService {
        TranslationTagService::new(self.provider.clone())
    }

    pub fn purport_tags(&self) -> PurportSectionTagService {
        PurportSectionTagService::new(self.provider.clone())
    }

    /// Imports a verse `canto.chapter.verse` with placeholder text and the given purport.
    pub async fn add_verse(
        &self,
        canto_num: i64,
        chapter_num: i64,
        verse_num: i64,
        purport: Option<&str>,
    ) -> Result<Verse> {
        let verse = sample_verse(canto_num, chapter_num, verse_num, purport);
        let conn = self.provider.connect()?;
        verses::insert_verse(&conn, &verse).await?;
        Ok(verse)
    }

    /// Adds a root tag.
    pub async fn add_root_tag(&self, name: &str, is_leaf: bool) -> Result<Tag> {
        self.add_tag(name, 1, None, is_leaf).await
    }

    pub async fn add_tag(
        &self,
        name: &str,
        level: i64,
        parent_id: Option<i64>,
        is_leaf: bool,
    ) -> Result<Tag> {
        let conn = self.provider.connect()?;
        let tag = taxonomy::create_tag(
            &conn,
            &NewTag {
                name: name.to_string(),
                level,
                parent_id,
                is_leaf,
            },
        )
        .await?;
        Ok(tag)
    }

    /// A freshly registered user, who starts with the tagger role.
    pub async fn tagger(&self, identifier: &str) -> Result<User> {
        Ok(get_or_create_user(&self.provider.db, identifier).await?)
    }

    /// A registered user promoted to the reviewer role.
    pub async fn reviewer(&self, identifier: &str) -> Result<User> {
        let user = get_or_create_user(&self.provider.db, identifier).await?;
        Ok(set_user_role(&self.provider.db, &user.id, REVIEWER_ROLE).await?)
    }
}

// --- Test-Specific Helpers ---

/// Builds a verse with deterministic placeholder text.
pub fn sample_verse(
    canto_num: i64,
    chapter_num: i64,
    verse_num: i64,
    purport: Option<&str>,
) -> Verse {
    let verse_id = format!("{canto_num}.{chapter_num}.{verse_num}");
    Verse {
        verse_id: verse_id.clone(),
        canto_num,
        chapter_num,
        verse_num,
        verse_num_end: None,
        verse: format!("Verse text of {verse_id}"),
        synonyms: format!("Synonyms of {verse_id}"),
        devanagari: format!("Devanagari of {verse_id}"),
        translation: format!("Translation of {verse_id}"),
        purport: purport.map(String::from),
        context: None,
        title: None,
    }
}
