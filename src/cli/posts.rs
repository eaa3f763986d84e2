use crate::models::PostFilter;
use crate::{services::posts, Config};
use anyhow::Result;
use std::path::Path;

use super::PostsCommand;

pub async fn run(config_path: &Path, command: PostsCommand) -> Result<()> {
    let config = Config::load(config_path)?;
    let db = config.open_database()?;

    match command {
        PostsCommand::List { tag, limit, json } => {
            let filter = PostFilter {
                tag,
                author_id: None,
                limit: Some(limit.unwrap_or(config.listing.posts_per_page)),
            };
            let mut details = posts::list_posts_with_related(&db, &filter)?;
            posts::fetch_with_comments_count(&db, &mut details)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&details)?);
                return Ok(());
            }
            for detail in details {
                let tags: Vec<&str> = detail.tags.iter().map(|t| t.tag.title.as_str()).collect();
                println!(
                    "{}  {} by {} [{}] likes={} comments={}",
                    detail.post.published_at,
                    detail.post,
                    detail.author.username,
                    tags.join(", "),
                    detail.likes_count,
                    detail.comments_count.unwrap_or_default(),
                );
            }
        }
        PostsCommand::Popular { limit, json } => {
            let limit = limit.unwrap_or(config.listing.popular_limit);
            let mut popular = posts::popular_posts(&db, Some(limit))?;
            posts::fetch_with_comments_count(&db, &mut popular)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&popular)?);
                return Ok(());
            }
            println!("{:<40} {:>6} {:>9}", "TITLE", "LIKES", "COMMENTS");
            println!("{}", "-".repeat(57));
            for entry in popular {
                println!(
                    "{:<40} {:>6} {:>9}",
                    entry.post.title,
                    entry.likes_count,
                    entry.comments_count.unwrap_or_default()
                );
            }
        }
    }

    Ok(())
}
