use crate::{services::tags, Config};
use anyhow::Result;
use std::path::Path;

use super::TagsCommand;

pub async fn run(config_path: &Path, command: TagsCommand) -> Result<()> {
    let config = Config::load(config_path)?;
    let db = config.open_database()?;

    match command {
        TagsCommand::List => {
            for tag in tags::list_tags(&db)? {
                println!("{}", tag);
            }
        }
        TagsCommand::Popular { limit, json } => {
            let limit = limit.unwrap_or(config.listing.popular_limit);
            let popular = tags::popular_tags(&db, Some(limit))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&popular)?);
                return Ok(());
            }
            println!("{:<22} {:>6}", "TAG", "POSTS");
            println!("{}", "-".repeat(29));
            for entry in popular {
                println!("{:<22} {:>6}", entry.tag.title, entry.posts_count);
            }
        }
    }

    Ok(())
}
