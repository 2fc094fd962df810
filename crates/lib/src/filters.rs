//! Translates listing filters into a SQL `WHERE` clause.

use crate::types::TagFilters;
use turso::Value as TursoValue;

/// A `WHERE` clause (empty when no filter is set) and its positional parameters.
#[derive(Debug, Default)]
pub struct FilterClause {
    pub sql: String,
    pub params: Vec<TursoValue>,
}

impl TagFilters {
    pub fn is_empty(&self) -> bool {
        self.canto_num.is_none() && self.chapter_num.is_none() && self.verse_id.is_none()
    }

    /// Builds exact-match conditions against the verse joined as `v`.
    /// Absent filters impose no constraint.
    pub fn to_clause(&self) -> FilterClause {
        let mut conditions: Vec<&str> = Vec::new();
        let mut params: Vec<TursoValue> = Vec::new();

        if let Some(canto_num) = self.canto_num {
            conditions.push("v.canto_num = ?");
            params.push(canto_num.into());
        }
        if let Some(chapter_num) = self.chapter_num {
            conditions.push("v.chapter_num = ?");
            params.push(chapter_num.into());
        }
        if let Some(verse_id) = &self.verse_id {
            conditions.push("v.verse_id = ?");
            params.push(verse_id.clone().into());
        }

        if conditions.is_empty() {
            return FilterClause::default();
        }
        FilterClause {
            sql: format!(" WHERE {}", conditions.join(" AND ")),
            params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filters_produce_no_clause() {
        let clause = TagFilters::default().to_clause();
        assert!(clause.sql.is_empty());
        assert!(clause.params.is_empty());
    }

    #[test]
    fn only_supplied_filters_are_applied() {
        let filters = TagFilters {
            canto_num: Some(1),
            chapter_num: None,
            verse_id: Some("1.2.3".to_string()),
        };
        let clause = filters.to_clause();
        assert_eq!(clause.sql, " WHERE v.canto_num = ? AND v.verse_id = ?");
        assert_eq!(clause.params.len(), 2);
    }
}
