use crate::models::MAX_POST_TITLE_LENGTH;
use slug::slugify;

pub const MAX_SLUG_LENGTH: usize = MAX_POST_TITLE_LENGTH;

pub fn generate_slug(title: &str) -> String {
    let slug = slugify(title);
    match slug.char_indices().nth(MAX_SLUG_LENGTH) {
        Some((cut, _)) => slug[..cut].trim_end_matches('-').to_string(),
        None => slug,
    }
}

/// Letters, digits, hyphens and underscores only.
pub fn validate_slug(slug: &str) -> bool {
    if slug.is_empty() || slug.len() > MAX_SLUG_LENGTH {
        return false;
    }
    slug.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
