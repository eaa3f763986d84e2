use super::UserSummary;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub text: String,
    pub published_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentWithAuthor {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: UserSummary,
}

/// Who wrote what where, used for admin listings and log lines.
#[derive(Debug, Clone, Serialize)]
pub struct CommentLabel {
    pub author_username: String,
    pub post_title: String,
}

impl fmt::Display for CommentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} under {}", self.author_username, self.post_title)
    }
}

#[derive(Debug, Deserialize)]
pub struct NewComment {
    pub post_id: i64,
    pub author_id: i64,
    pub text: String,
    pub published_at: Option<chrono::DateTime<chrono::Utc>>,
}
