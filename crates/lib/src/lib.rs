//! # Verse Tagging
//!
//! This crate stores a hierarchical tag taxonomy and lets taggers attach tags
//! to scripture verses, either to a whole translation or to a character range
//! of a purport. Reviewers then mark those assignments as reviewed.
//!
//! Storage is a local SQLite database accessed through [`SqliteProvider`].
//! Payload validation lives in [`schema`] and never touches the store.

pub mod errors;
pub mod filters;
pub mod providers;
pub mod schema;
pub mod tag_requests;
pub mod tagging;
pub mod taxonomy;
pub mod types;
pub mod verses;

pub use errors::{FieldErrors, TagError};
pub use providers::db::sqlite::SqliteProvider;
pub use tagging::{PurportSectionTagService, TranslationTagService};
pub use taxonomy::TagTree;
pub use types::{
    NewTag, PurportSectionTag, Tag, TagFilters, TagRequest, TranslationTag, Verse,
};
