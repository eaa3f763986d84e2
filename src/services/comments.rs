use crate::models::{format_timestamp, Comment, CommentLabel, CommentWithAuthor, NewComment, UserSummary};
use crate::{Database, ModelError};
use anyhow::Result;

pub fn create_comment(db: &Database, comment: &NewComment) -> Result<i64> {
    if comment.text.trim().is_empty() {
        return Err(ModelError::Validation("Comment text cannot be empty".into()).into());
    }
    let published_at = format_timestamp(comment.published_at.unwrap_or_else(chrono::Utc::now));

    let conn = db.get()?;
    let post_exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM posts WHERE id = ?)",
        [comment.post_id],
        |row| row.get(0),
    )?;
    if !post_exists {
        return Err(ModelError::PostNotFound(comment.post_id).into());
    }
    let author_exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)",
        [comment.author_id],
        |row| row.get(0),
    )?;
    if !author_exists {
        return Err(ModelError::UserNotFound(comment.author_id).into());
    }

    conn.execute(
        "INSERT INTO comments (post_id, author_id, text, published_at) VALUES (?, ?, ?, ?)",
        (comment.post_id, comment.author_id, &comment.text, &published_at),
    )?;
    Ok(conn.last_insert_rowid())
}

/// Comments on a post, oldest first, each with its author.
pub fn list_comments_for_post(db: &Database, post_id: i64) -> Result<Vec<CommentWithAuthor>> {
    let conn = db.get()?;
    let mut stmt = conn.prepare(
        r#"
        SELECT c.id, c.post_id, c.author_id, c.text, c.published_at, u.id, u.username
        FROM comments c
        JOIN users u ON u.id = c.author_id
        WHERE c.post_id = ?
        ORDER BY c.published_at, c.id
        "#,
    )?;
    let comments = stmt
        .query_map([post_id], row_to_comment_with_author)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(comments)
}

pub fn count_comments(db: &Database, post_id: i64) -> Result<i64> {
    let conn = db.get()?;
    let count = conn.query_row(
        "SELECT COUNT(*) FROM comments WHERE post_id = ?",
        [post_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn describe_comment(db: &Database, id: i64) -> Result<Option<CommentLabel>> {
    let conn = db.get()?;
    let label = conn.query_row(
        r#"
        SELECT u.username, p.title
        FROM comments c
        JOIN users u ON u.id = c.author_id
        JOIN posts p ON p.id = c.post_id
        WHERE c.id = ?
        "#,
        [id],
        |row| {
            Ok(CommentLabel {
                author_username: row.get(0)?,
                post_title: row.get(1)?,
            })
        },
    );
    match label {
        Ok(label) => Ok(Some(label)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn delete_comment(db: &Database, id: i64) -> Result<bool> {
    let conn = db.get()?;
    let affected = conn.execute("DELETE FROM comments WHERE id = ?", [id])?;
    Ok(affected > 0)
}

/// Expects columns: comment id, post_id, author_id, text, published_at, user id, username.
pub(crate) fn row_to_comment_with_author(row: &rusqlite::Row) -> rusqlite::Result<CommentWithAuthor> {
    Ok(CommentWithAuthor {
        comment: Comment {
            id: row.get(0)?,
            post_id: row.get(1)?,
            author_id: row.get(2)?,
            text: row.get(3)?,
            published_at: row.get(4)?,
        },
        author: UserSummary {
            id: row.get(5)?,
            username: row.get(6)?,
        },
    })
}
