//! Storage for proposals of new tags. Only one pending proposal exists per verse.

use crate::{
    errors::{map_constraint_error, TagError},
    providers::db::sqlite::{nullable, opt_text},
    types::TagRequest,
};
use tracing::info;
use turso::{params, Connection};

const MAX_NAME_CHARS: usize = 70;
const MAX_PARENT_CHARS: usize = 60;
const MAX_DESCRIPTION_CHARS: usize = 1000;

fn check_len(field: &str, value: &str, max: usize) -> Result<(), TagError> {
    if value.chars().count() > max {
        return Err(TagError::Validation(format!(
            "Tag request {field} is longer than {max} characters"
        )));
    }
    Ok(())
}

pub async fn create_tag_request(conn: &Connection, request: &TagRequest) -> Result<(), TagError> {
    check_len("name", &request.name, MAX_NAME_CHARS)?;
    check_len("parent", &request.parent, MAX_PARENT_CHARS)?;
    if let Some(description) = &request.description {
        check_len("description", description, MAX_DESCRIPTION_CHARS)?;
    }

    conn.execute(
        "INSERT INTO tag_requests (verse_id, name, parent, description, initiator, approver)
         VALUES (?, ?, ?, ?, ?, ?)",
        params![
            request.verse_id.clone(),
            request.name.clone(),
            request.parent.clone(),
            nullable(request.description.clone()),
            nullable(request.initiator.clone()),
            nullable(request.approver.clone())
        ],
    )
    .await
    .map_err(|e| {
        map_constraint_error(e, &format!("Tag request for verse '{}'", request.verse_id))
    })?;
    info!(verse_id = %request.verse_id, name = %request.name, "Stored tag request.");
    Ok(())
}

pub async fn get_tag_request(
    conn: &Connection,
    verse_id: &str,
) -> Result<Option<TagRequest>, TagError> {
    let mut rows = conn
        .query(
            "SELECT verse_id, name, parent, description, initiator, approver
             FROM tag_requests WHERE verse_id = ?",
            params![verse_id],
        )
        .await?;
    let Some(row) = rows.next().await? else {
        return Ok(None);
    };
    Ok(Some(TagRequest {
        verse_id: row.get(0)?,
        name: row.get(1)?,
        parent: row.get(2)?,
        description: opt_text(&row, 3)?,
        initiator: opt_text(&row, 4)?,
        approver: opt_text(&row, 5)?,
    }))
}
