use crate::models::{
    format_timestamp, CommentCounted, CommentWithAuthor, NewPost, Post, PostDetail, PostFilter,
    PostSummary, Tag, TagWithCount, UserSummary, MAX_POST_TITLE_LENGTH,
};
use crate::services::comments::row_to_comment_with_author;
use crate::services::slug::{generate_slug, validate_slug};
use crate::services::tags::{ensure_tag, sql_limit};
use crate::{Database, ModelError};
use anyhow::Result;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::collections::HashMap;

const POST_COLUMNS: &str = "p.id, p.title, p.text, p.slug, p.image, p.published_at, p.author_id";

fn validate_post(title: &str, slug: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(ModelError::Validation("Post title cannot be empty".into()).into());
    }
    if title.chars().count() > MAX_POST_TITLE_LENGTH {
        return Err(ModelError::Validation(format!(
            "Post title must be {} characters or less",
            MAX_POST_TITLE_LENGTH
        ))
        .into());
    }
    if !validate_slug(slug) {
        return Err(ModelError::Validation(format!("Invalid slug '{}'", slug)).into());
    }
    Ok(())
}

/// Inserts a post and links its tags. Only staff users may author posts.
pub fn create_post(db: &Database, post: &NewPost) -> Result<i64> {
    let slug = post
        .slug
        .clone()
        .unwrap_or_else(|| generate_slug(&post.title));
    validate_post(&post.title, &slug)?;

    let mut conn = db.get()?;
    let tx = conn.transaction()?;

    let author = tx.query_row(
        "SELECT username, is_staff FROM users WHERE id = ?",
        [post.author_id],
        |row| Ok((row.get::<_, String>(0)?, row.get::<_, bool>(1)?)),
    );
    match author {
        Ok((_, true)) => {}
        Ok((username, false)) => return Err(ModelError::AuthorNotStaff(username).into()),
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            return Err(ModelError::UserNotFound(post.author_id).into())
        }
        Err(e) => return Err(e.into()),
    }

    tx.execute(
        "INSERT INTO posts (title, text, slug, image, published_at, author_id) VALUES (?, ?, ?, ?, ?, ?)",
        (
            &post.title,
            &post.text,
            &slug,
            &post.image,
            format_timestamp(post.published_at),
            post.author_id,
        ),
    )?;
    let id = tx.last_insert_rowid();
    link_tags(&tx, id, &post.tags)?;
    tx.commit()?;

    tracing::info!(post_id = id, "Created post '{}'", slug);
    Ok(id)
}

fn link_tags(conn: &Connection, post_id: i64, titles: &[String]) -> Result<()> {
    for title in titles {
        let tag_id = ensure_tag(conn, title)?;
        conn.execute(
            "INSERT OR IGNORE INTO post_tags (post_id, tag_id) VALUES (?, ?)",
            (post_id, tag_id),
        )?;
    }
    Ok(())
}

/// Replaces the post's tag set with `titles`, creating missing tags.
pub fn set_post_tags(db: &Database, post_id: i64, titles: &[String]) -> Result<()> {
    let mut conn = db.get()?;
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM post_tags WHERE post_id = ?", [post_id])?;
    link_tags(&tx, post_id, titles)?;
    tx.commit()?;
    Ok(())
}

pub fn get_post(db: &Database, id: i64) -> Result<Option<Post>> {
    let conn = db.get()?;
    let sql = format!("SELECT {} FROM posts p WHERE p.id = ?", POST_COLUMNS);
    match conn.query_row(&sql, [id], row_to_post) {
        Ok(post) => Ok(Some(post)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_post_by_slug(db: &Database, slug: &str) -> Result<Option<Post>> {
    let conn = db.get()?;
    let sql = format!(
        "SELECT {} FROM posts p WHERE p.slug = ? ORDER BY p.published_at DESC LIMIT 1",
        POST_COLUMNS
    );
    match conn.query_row(&sql, [slug], row_to_post) {
        Ok(post) => Ok(Some(post)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Posts in their default order, newest publication first.
pub fn list_posts(db: &Database, limit: Option<usize>) -> Result<Vec<Post>> {
    let conn = db.get()?;
    let sql = format!(
        "SELECT {} FROM posts p ORDER BY p.published_at DESC, p.id DESC LIMIT ?",
        POST_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let posts = stmt
        .query_map([sql_limit(limit)], row_to_post)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(posts)
}

/// Deletes the post; comments, likes and tag links go with it.
pub fn delete_post(db: &Database, id: i64) -> Result<bool> {
    let conn = db.get()?;
    let affected = conn.execute("DELETE FROM posts WHERE id = ?", [id])?;
    if affected > 0 {
        tracing::info!(post_id = id, "Deleted post");
    }
    Ok(affected > 0)
}

/// Records a like. Returns false when the user already liked the post.
pub fn like_post(db: &Database, post_id: i64, user_id: i64) -> Result<bool> {
    let conn = db.get()?;
    let affected = conn.execute(
        "INSERT OR IGNORE INTO post_likes (post_id, user_id) VALUES (?, ?)",
        (post_id, user_id),
    )?;
    Ok(affected > 0)
}

pub fn unlike_post(db: &Database, post_id: i64, user_id: i64) -> Result<bool> {
    let conn = db.get()?;
    let affected = conn.execute(
        "DELETE FROM post_likes WHERE post_id = ? AND user_id = ?",
        (post_id, user_id),
    )?;
    Ok(affected > 0)
}

pub fn likers(db: &Database, post_id: i64) -> Result<Vec<UserSummary>> {
    let conn = db.get()?;
    let mut stmt = conn.prepare(
        r#"
        SELECT u.id, u.username
        FROM post_likes pl
        JOIN users u ON u.id = pl.user_id
        WHERE pl.post_id = ?
        ORDER BY u.username
        "#,
    )?;
    let users = stmt
        .query_map([post_id], |row| {
            Ok(UserSummary {
                id: row.get(0)?,
                username: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(users)
}

/// Posts annotated with their like count, most liked first.
pub fn popular_posts(db: &Database, limit: Option<usize>) -> Result<Vec<PostSummary>> {
    let conn = db.get()?;
    let sql = format!(
        r#"
        SELECT {}, COUNT(pl.user_id) AS likes_count
        FROM posts p
        LEFT JOIN post_likes pl ON pl.post_id = p.id
        GROUP BY p.id
        ORDER BY likes_count DESC, p.published_at DESC
        LIMIT ?
        "#,
        POST_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let posts = stmt
        .query_map([sql_limit(limit)], |row| {
            Ok(PostSummary {
                post: row_to_post(row)?,
                likes_count: row.get(7)?,
                comments_count: None,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(count = posts.len(), "Fetched popular posts");
    Ok(posts)
}

/// Posts with author, tags, comments and like count for list rendering.
///
/// Runs one query for the posts and their authors and like counts, then one
/// batch query for tags and one for comments, however many posts match.
pub fn list_posts_with_related(db: &Database, filter: &PostFilter) -> Result<Vec<PostDetail>> {
    let conn = db.get()?;
    fetch_details(&conn, filter, None)
}

pub fn get_post_with_related(db: &Database, slug: &str) -> Result<Option<PostDetail>> {
    let conn = db.get()?;
    let filter = PostFilter {
        limit: Some(1),
        ..PostFilter::default()
    };
    Ok(fetch_details(&conn, &filter, Some(slug))?.into_iter().next())
}

fn fetch_details(
    conn: &Connection,
    filter: &PostFilter,
    slug: Option<&str>,
) -> Result<Vec<PostDetail>> {
    let mut sql = format!(
        r#"
        SELECT {}, u.id, u.username, COUNT(DISTINCT pl.user_id) AS likes_count
        FROM posts p
        JOIN users u ON u.id = p.author_id
        LEFT JOIN post_likes pl ON pl.post_id = p.id
        WHERE 1=1
        "#,
        POST_COLUMNS
    );
    let mut params: Vec<Value> = Vec::new();

    if let Some(slug) = slug {
        sql.push_str(" AND p.slug = ?");
        params.push(Value::Text(slug.to_string()));
    }
    if let Some(tag) = &filter.tag {
        sql.push_str(
            " AND p.id IN (SELECT pt.post_id FROM post_tags pt JOIN tags t ON t.id = pt.tag_id WHERE t.title = ?)",
        );
        params.push(Value::Text(tag.trim().to_lowercase()));
    }
    if let Some(author_id) = filter.author_id {
        sql.push_str(" AND p.author_id = ?");
        params.push(Value::Integer(author_id));
    }
    sql.push_str(" GROUP BY p.id ORDER BY p.published_at DESC, p.id DESC LIMIT ?");
    params.push(Value::Integer(sql_limit(filter.limit)));

    let mut stmt = conn.prepare(&sql)?;
    let rows: Vec<(Post, UserSummary, i64)> = stmt
        .query_map(params_from_iter(params.iter()), |row| {
            Ok((
                row_to_post(row)?,
                UserSummary {
                    id: row.get(7)?,
                    username: row.get(8)?,
                },
                row.get(9)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    if rows.is_empty() {
        return Ok(vec![]);
    }

    let post_ids: Vec<i64> = rows.iter().map(|(post, _, _)| post.id).collect();
    let mut tags_by_post = fetch_tags_for_posts(conn, &post_ids)?;
    let mut comments_by_post = fetch_comments_for_posts(conn, &post_ids)?;

    let details: Vec<PostDetail> = rows
        .into_iter()
        .map(|(post, author, likes_count)| PostDetail {
            tags: tags_by_post.remove(&post.id).unwrap_or_default(),
            comments: comments_by_post.remove(&post.id).unwrap_or_default(),
            post,
            author,
            likes_count,
            comments_count: None,
        })
        .collect();
    tracing::debug!(count = details.len(), "Fetched posts with related data");
    Ok(details)
}

/// Tags of the given posts, each carrying its overall post count.
fn fetch_tags_for_posts(
    conn: &Connection,
    post_ids: &[i64],
) -> Result<HashMap<i64, Vec<TagWithCount>>> {
    let sql = r#"
        SELECT pt.post_id, t.id, t.title,
               (SELECT COUNT(*) FROM post_tags c WHERE c.tag_id = t.id) AS posts_count
        FROM post_tags pt
        JOIN tags t ON t.id = pt.tag_id
        WHERE pt.post_id IN (SELECT value FROM json_each(?))
        ORDER BY t.title
        "#;
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([id_list(post_ids)?], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            TagWithCount {
                tag: Tag {
                    id: row.get(1)?,
                    title: row.get(2)?,
                },
                posts_count: row.get(3)?,
            },
        ))
    })?;

    let mut tags_by_post: HashMap<i64, Vec<TagWithCount>> = HashMap::new();
    for row in rows {
        let (post_id, tag) = row?;
        tags_by_post.entry(post_id).or_default().push(tag);
    }
    Ok(tags_by_post)
}

fn fetch_comments_for_posts(
    conn: &Connection,
    post_ids: &[i64],
) -> Result<HashMap<i64, Vec<CommentWithAuthor>>> {
    let sql = r#"
        SELECT c.id, c.post_id, c.author_id, c.text, c.published_at, u.id, u.username
        FROM comments c
        JOIN users u ON u.id = c.author_id
        WHERE c.post_id IN (SELECT value FROM json_each(?))
        ORDER BY c.published_at, c.id
        "#;
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([id_list(post_ids)?], row_to_comment_with_author)?;

    let mut comments_by_post: HashMap<i64, Vec<CommentWithAuthor>> = HashMap::new();
    for row in rows {
        let comment = row?;
        comments_by_post
            .entry(comment.comment.post_id)
            .or_default()
            .push(comment);
    }
    Ok(comments_by_post)
}

/// Attaches comment counts to posts that were already fetched.
///
/// Counting comments in a separate query keeps the like-count aggregation
/// free of the comments join, which would multiply rows and inflate both
/// counts. Fails with [`ModelError::MissingCommentCount`] if a post is no
/// longer in the database; in that case no count is assigned.
pub fn fetch_with_comments_count<T: CommentCounted>(db: &Database, posts: &mut [T]) -> Result<()> {
    if posts.is_empty() {
        return Ok(());
    }

    let post_ids: Vec<i64> = posts.iter().map(|p| p.post_id()).collect();
    let conn = db.get()?;
    let sql = r#"
        SELECT p.id, COUNT(c.id) AS comments_count
        FROM posts p
        LEFT JOIN comments c ON c.post_id = p.id
        WHERE p.id IN (SELECT value FROM json_each(?))
        GROUP BY p.id
        "#;
    let mut stmt = conn.prepare(sql)?;
    let count_for_id: HashMap<i64, i64> = stmt
        .query_map([id_list(&post_ids)?], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
        })?
        .collect::<Result<HashMap<_, _>, _>>()?;

    let counts = post_ids
        .iter()
        .map(|id| {
            count_for_id
                .get(id)
                .copied()
                .ok_or(ModelError::MissingCommentCount(*id))
        })
        .collect::<Result<Vec<i64>, _>>()?;

    for (post, count) in posts.iter_mut().zip(counts) {
        post.set_comments_count(count);
    }
    Ok(())
}

/// Ids bound as one JSON array and expanded with `json_each`, so a batch
/// query stays a single statement with a single parameter at any size.
fn id_list(ids: &[i64]) -> Result<String> {
    Ok(serde_json::to_string(ids)?)
}

fn row_to_post(row: &rusqlite::Row) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        title: row.get(1)?,
        text: row.get(2)?,
        slug: row.get(3)?,
        image: row.get(4)?,
        published_at: row.get(5)?,
        author_id: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;
    use crate::services::users;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn setup_test_db() -> Database {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let db = Database::open_memory(&format!("posts_test_{}", id)).unwrap();
        db.migrate().unwrap();
        db
    }

    fn staff(db: &Database) -> i64 {
        users::create_user(
            db,
            &NewUser {
                username: "editor".into(),
                email: "editor@example.com".into(),
                password: "Password123".into(),
                is_staff: true,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_id_list() {
        assert_eq!(id_list(&[7]).unwrap(), "[7]");
        assert_eq!(id_list(&[1, 2, 3]).unwrap(), "[1,2,3]");
    }

    #[test]
    fn test_create_post_derives_slug() {
        let db = setup_test_db();
        let author_id = staff(&db);
        let id = create_post(
            &db,
            &NewPost {
                title: "Hello World".into(),
                slug: None,
                text: "body".into(),
                image: "hello.png".into(),
                published_at: chrono::Utc::now(),
                author_id,
                tags: vec![],
            },
        )
        .unwrap();

        let post = get_post(&db, id).unwrap().unwrap();
        assert_eq!(post.slug, "hello-world");
        assert_eq!(post.absolute_url(), "/post/hello-world");
        assert_eq!(post.to_string(), "Hello World");
    }

    #[test]
    fn test_create_post_rejects_bad_slug() {
        let db = setup_test_db();
        let author_id = staff(&db);
        let err = create_post(
            &db,
            &NewPost {
                title: "Hello".into(),
                slug: Some("Not A Slug".into()),
                text: "body".into(),
                image: "hello.png".into(),
                published_at: chrono::Utc::now(),
                author_id,
                tags: vec![],
            },
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ModelError>(),
            Some(ModelError::Validation(_))
        ));
    }

    #[test]
    fn test_backfill_empty_collection() {
        let db = setup_test_db();
        let mut posts: Vec<PostSummary> = Vec::new();
        fetch_with_comments_count(&db, &mut posts).unwrap();
        assert!(posts.is_empty());
    }

    /// Inserts `count` posts directly, tagging and commenting on the first one.
    fn seed_posts(db: &Database, author_id: i64, count: usize) -> i64 {
        let mut conn = db.get().unwrap();
        let tx = conn.transaction().unwrap();
        {
            let mut insert = tx
                .prepare(
                    "INSERT INTO posts (title, text, slug, image, published_at, author_id)
                     VALUES (?, '', ?, 'x.png', '2024-01-01 00:00:00', ?)",
                )
                .unwrap();
            for i in 0..count {
                insert
                    .execute((format!("Post {}", i), format!("post-{}", i), author_id))
                    .unwrap();
            }
        }
        let first: i64 = tx
            .query_row("SELECT MIN(id) FROM posts", [], |row| row.get(0))
            .unwrap();
        link_tags(&tx, first, &["bulk".to_string()]).unwrap();
        tx.execute(
            "INSERT INTO comments (post_id, author_id, text, published_at)
             VALUES (?, ?, 'hi', '2024-01-02 00:00:00')",
            (first, author_id),
        )
        .unwrap();
        tx.commit().unwrap();
        first
    }

    // SQLite caps bound parameters per statement at 32766.
    const MORE_THAN_SQLITE_VARIABLES: usize = 33_000;

    #[test]
    fn test_batch_queries_handle_more_posts_than_sqlite_variables() {
        let db = setup_test_db();
        let author_id = staff(&db);
        let first = seed_posts(&db, author_id, MORE_THAN_SQLITE_VARIABLES);

        let details = list_posts_with_related(&db, &PostFilter::default()).unwrap();
        assert_eq!(details.len(), MORE_THAN_SQLITE_VARIABLES);
        let seeded = details.iter().find(|d| d.post.id == first).unwrap();
        assert_eq!(seeded.tags.len(), 1);
        assert_eq!(seeded.comments.len(), 1);

        let mut popular = popular_posts(&db, None).unwrap();
        fetch_with_comments_count(&db, &mut popular).unwrap();
        assert_eq!(popular.len(), MORE_THAN_SQLITE_VARIABLES);
        assert!(popular.iter().all(|p| p.comments_count.is_some()));
        let seeded = popular.iter().find(|p| p.post.id == first).unwrap();
        assert_eq!(seeded.comments_count, Some(1));
    }

    thread_local! {
        static STATEMENTS: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
    }

    fn count_statement(_sql: &str) {
        STATEMENTS.with(|n| n.set(n.get() + 1));
    }

    fn statements_for_listing(db: &Database) -> usize {
        let mut conn = db.get().unwrap();
        conn.trace(Some(count_statement));
        STATEMENTS.with(|n| n.set(0));
        let result = fetch_details(&conn, &PostFilter::default(), None);
        conn.trace(None);
        result.unwrap();
        STATEMENTS.with(|n| n.get())
    }

    #[test]
    fn test_listing_query_count_is_fixed() {
        let db = setup_test_db();
        let author_id = staff(&db);
        assert_eq!(statements_for_listing(&db), 1);

        seed_posts(&db, author_id, 1);
        assert_eq!(statements_for_listing(&db), 3);

        seed_posts(&db, author_id, 19);
        assert_eq!(
            list_posts_with_related(&db, &PostFilter::default()).unwrap().len(),
            20
        );
        assert_eq!(statements_for_listing(&db), 3);
    }
}
