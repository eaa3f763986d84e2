use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_TAG_TITLE_LENGTH: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub title: String,
}

impl Tag {
    pub fn absolute_url(&self) -> String {
        format!("/tag/{}", self.title)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// A tag annotated with the number of posts carrying it.
#[derive(Debug, Clone, Serialize)]
pub struct TagWithCount {
    #[serde(flatten)]
    pub tag: Tag,
    pub posts_count: i64,
}
