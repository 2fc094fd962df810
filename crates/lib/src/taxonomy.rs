//! # Tag Taxonomy
//!
//! The tag hierarchy is a forest rooted at level-1 tags. Each tag points at its
//! parent and sits exactly one level below it, so parent links can never form
//! a cycle. This module creates tags under that rule and materializes the whole
//! forest as a nested name mapping.

use crate::{
    errors::{map_constraint_error, TagError},
    providers::db::sqlite::{nullable, sql::TAG_COLUMNS},
    schema::MAX_TAG_NAME_CHARS,
    types::{NewTag, Tag},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};
use turso::{params, Connection, Value as TursoValue};

/// Tag name → subtree. A leaf maps to an empty tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagTree(pub BTreeMap<String, TagTree>);

impl TagTree {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&TagTree> {
        self.0.get(name)
    }
}

/// All tags held in memory, indexed by id, with child lists per parent.
struct TagArena {
    tags: Vec<Tag>,
    children: HashMap<i64, Vec<usize>>,
}

impl TagArena {
    fn new(tags: Vec<Tag>) -> Self {
        let mut children: HashMap<i64, Vec<usize>> = HashMap::new();
        for (idx, tag) in tags.iter().enumerate() {
            if let Some(parent_id) = tag.parent_id {
                children.entry(parent_id).or_default().push(idx);
            }
        }
        Self { tags, children }
    }

    fn expand(&self, idx: usize) -> TagTree {
        let tag = &self.tags[idx];
        if tag.is_leaf {
            return TagTree::default();
        }
        let subtree = self
            .children
            .get(&tag.id)
            .into_iter()
            .flatten()
            // Only deeper tags are followed, which bounds the recursion.
            .filter(|&&child| self.tags[child].level > tag.level)
            .map(|&child| (self.tags[child].name.clone(), self.expand(child)))
            .collect();
        TagTree(subtree)
    }

    fn tree(&self) -> TagTree {
        TagTree(
            self.tags
                .iter()
                .enumerate()
                .filter(|(_, tag)| tag.level == 1)
                .map(|(idx, tag)| (tag.name.clone(), self.expand(idx)))
                .collect(),
        )
    }
}

/// Loads every tag ordered by level, then id.
pub async fn list_tags(conn: &Connection) -> Result<Vec<Tag>, TagError> {
    let mut rows = conn
        .query(
            &format!("SELECT {TAG_COLUMNS} FROM tags ORDER BY level, id"),
            (),
        )
        .await?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next().await? {
        tags.push(Tag::try_from(&row)?);
    }
    Ok(tags)
}

/// Materializes the full taxonomy. Returns an empty tree when no roots exist.
pub async fn get_tag_tree(conn: &Connection) -> Result<TagTree, TagError> {
    let tags = list_tags(conn).await?;
    debug!("Building tag tree from {} tags.", tags.len());
    Ok(TagArena::new(tags).tree())
}

pub async fn get_tag(conn: &Connection, id: i64) -> Result<Option<Tag>, TagError> {
    let mut rows = conn
        .query(
            &format!("SELECT {TAG_COLUMNS} FROM tags WHERE id = ?"),
            params![id],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(Tag::try_from(&row)?)),
        None => Ok(None),
    }
}

/// Resolves a tag name from an assignment payload.
///
/// The same name may exist at several levels; without `level` such a name
/// is ambiguous and rejected.
pub async fn find_tag_by_name(
    conn: &Connection,
    name: &str,
    level: Option<i64>,
) -> Result<Tag, TagError> {
    let mut sql = format!("SELECT {TAG_COLUMNS} FROM tags WHERE name = ?");
    let mut query_params: Vec<TursoValue> = vec![name.to_string().into()];
    if let Some(level) = level {
        sql.push_str(" AND level = ?");
        query_params.push(level.into());
    }

    let mut rows = conn.query(&sql, query_params).await?;
    let mut matches = Vec::new();
    while let Some(row) = rows.next().await? {
        matches.push(Tag::try_from(&row)?);
    }

    match matches.len() {
        0 => Err(TagError::Validation(format!("Tag '{name}' does not exist"))),
        1 => Ok(matches.remove(0)),
        _ => Err(TagError::Validation(format!(
            "Tag name '{name}' exists at several levels; specify a level"
        ))),
    }
}

/// Adds a tag to the taxonomy.
///
/// Roots are level 1 with no parent. Any other tag needs an existing,
/// non-leaf parent exactly one level above it. A duplicate `(level, name)`
/// fails with `Conflict`.
pub async fn create_tag(conn: &Connection, new_tag: &NewTag) -> Result<Tag, TagError> {
    let name = new_tag.name.trim();
    if name.is_empty() || name.chars().count() > MAX_TAG_NAME_CHARS {
        return Err(TagError::Validation(format!(
            "Tag name must be between 1 and {MAX_TAG_NAME_CHARS} characters"
        )));
    }

    match new_tag.parent_id {
        None if new_tag.level != 1 => {
            return Err(TagError::Validation(format!(
                "Tag '{name}' has no parent and must be at level 1"
            )));
        }
        None => {}
        Some(parent_id) => {
            let parent = get_tag(conn, parent_id).await?.ok_or_else(|| {
                TagError::Validation(format!("Parent tag {parent_id} does not exist"))
            })?;
            if parent.is_leaf {
                return Err(TagError::Validation(format!(
                    "Parent tag '{}' is a leaf and cannot have children",
                    parent.name
                )));
            }
            if new_tag.level != parent.level + 1 {
                return Err(TagError::Validation(format!(
                    "Tag '{name}' must be at level {} under '{}'",
                    parent.level + 1,
                    parent.name
                )));
            }
        }
    }

    let mut existing = conn
        .query(
            "SELECT 1 FROM tags WHERE level = ? AND name = ?",
            params![new_tag.level, name],
        )
        .await?;
    let duplicate = existing.next().await?.is_some();
    drop(existing);
    if duplicate {
        return Err(TagError::Conflict(format!(
            "Tag '{name}' already exists at level {}",
            new_tag.level
        )));
    }

    let what = format!("Tag '{name}' at level {}", new_tag.level);
    let mut rows = conn
        .query(
            "INSERT INTO tags (name, level, parent_id, is_leaf) VALUES (?, ?, ?, ?) RETURNING id",
            params![name, new_tag.level, nullable(new_tag.parent_id), new_tag.is_leaf as i64],
        )
        .await
        .map_err(|e| map_constraint_error(e, &what))?;
    let id: i64 = match rows.next().await.map_err(|e| map_constraint_error(e, &what))? {
        Some(row) => row.get(0)?,
        None => {
            return Err(TagError::DataIntegrity(format!(
                "Insert of {what} returned no id"
            )))
        }
    };

    info!(tag_id = id, name = %name, level = new_tag.level, "Created tag.");
    Ok(Tag {
        id,
        name: name.to_string(),
        level: new_tag.level,
        parent_id: new_tag.parent_id,
        is_leaf: new_tag.is_leaf,
    })
}
