use crate::models::{Tag, TagWithCount, MAX_TAG_TITLE_LENGTH};
use crate::{Database, ModelError};
use anyhow::Result;
use rusqlite::Connection;

/// Normalizes a tag title the way it is stored: trimmed and lowercased.
pub fn clean_tag_title(title: &str) -> Result<String> {
    let cleaned = title.trim().to_lowercase();
    if cleaned.is_empty() {
        return Err(ModelError::Validation("Tag title cannot be empty".into()).into());
    }
    if cleaned.chars().count() > MAX_TAG_TITLE_LENGTH {
        return Err(ModelError::Validation(format!(
            "Tag title must be {} characters or less",
            MAX_TAG_TITLE_LENGTH
        ))
        .into());
    }
    Ok(cleaned)
}

/// Returns the id of the tag with this title, inserting it when missing.
/// Takes a bare connection so it can run inside a caller's transaction.
pub(crate) fn ensure_tag(conn: &Connection, title: &str) -> Result<i64> {
    let title = clean_tag_title(title)?;
    conn.execute(
        "INSERT INTO tags (title) VALUES (?) ON CONFLICT(title) DO NOTHING",
        [&title],
    )?;
    let id = conn.query_row("SELECT id FROM tags WHERE title = ?", [&title], |row| {
        row.get(0)
    })?;
    Ok(id)
}

pub fn create_tag(db: &Database, title: &str) -> Result<i64> {
    let conn = db.get()?;
    ensure_tag(&conn, title)
}

pub fn get_tag_by_title(db: &Database, title: &str) -> Result<Option<Tag>> {
    let title = title.trim().to_lowercase();
    let conn = db.get()?;
    match conn.query_row(
        "SELECT id, title FROM tags WHERE title = ?",
        [&title],
        row_to_tag,
    ) {
        Ok(tag) => Ok(Some(tag)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_tags(db: &Database) -> Result<Vec<Tag>> {
    let conn = db.get()?;
    let mut stmt = conn.prepare("SELECT id, title FROM tags ORDER BY title")?;
    let tags = stmt
        .query_map([], row_to_tag)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tags)
}

/// Tags annotated with their post count, most used first.
pub fn popular_tags(db: &Database, limit: Option<usize>) -> Result<Vec<TagWithCount>> {
    let conn = db.get()?;
    let mut stmt = conn.prepare(
        r#"
        SELECT t.id, t.title, COUNT(pt.post_id) AS posts_count
        FROM tags t
        LEFT JOIN post_tags pt ON pt.tag_id = t.id
        GROUP BY t.id
        ORDER BY posts_count DESC, t.title
        LIMIT ?
        "#,
    )?;
    let tags = stmt
        .query_map([sql_limit(limit)], |row| {
            Ok(TagWithCount {
                tag: row_to_tag(row)?,
                posts_count: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(count = tags.len(), "Fetched popular tags");
    Ok(tags)
}

pub fn delete_tag(db: &Database, id: i64) -> Result<bool> {
    let conn = db.get()?;
    let affected = conn.execute("DELETE FROM tags WHERE id = ?", [id])?;
    Ok(affected > 0)
}

/// SQLite reads a negative LIMIT as "no limit".
pub(crate) fn sql_limit(limit: Option<usize>) -> i64 {
    limit
        .map(|l| i64::try_from(l).unwrap_or(i64::MAX))
        .unwrap_or(-1)
}

pub(crate) fn row_to_tag(row: &rusqlite::Row) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get(0)?,
        title: row.get(1)?,
    })
}
