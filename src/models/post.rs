use super::{CommentWithAuthor, TagWithCount, UserSummary};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_POST_TITLE_LENGTH: usize = 200;

#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub slug: String,
    pub image: String,
    pub published_at: String,
    pub author_id: i64,
}

impl Post {
    pub fn absolute_url(&self) -> String {
        format!("/post/{}", self.slug)
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// A post annotated with its like count, as returned by the popularity query.
#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    #[serde(flatten)]
    pub post: Post,
    pub likes_count: i64,
    /// Filled in by the comment-count backfill; `None` until then.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments_count: Option<i64>,
}

/// A post with everything a list page renders, fetched in batches.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: Post,
    pub author: UserSummary,
    pub tags: Vec<TagWithCount>,
    pub comments: Vec<CommentWithAuthor>,
    pub likes_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments_count: Option<i64>,
}

/// Values that can receive a comment count computed after they were fetched.
pub trait CommentCounted {
    fn post_id(&self) -> i64;
    fn set_comments_count(&mut self, count: i64);
}

impl CommentCounted for PostSummary {
    fn post_id(&self) -> i64 {
        self.post.id
    }

    fn set_comments_count(&mut self, count: i64) {
        self.comments_count = Some(count);
    }
}

impl CommentCounted for PostDetail {
    fn post_id(&self) -> i64 {
        self.post.id
    }

    fn set_comments_count(&mut self, count: i64) {
        self.comments_count = Some(count);
    }
}

#[derive(Debug, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub slug: Option<String>,
    pub text: String,
    pub image: String,
    pub published_at: chrono::DateTime<chrono::Utc>,
    pub author_id: i64,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Narrows `list_posts_with_related`. Empty filter means every post.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub tag: Option<String>,
    pub author_id: Option<i64>,
    pub limit: Option<usize>,
}
