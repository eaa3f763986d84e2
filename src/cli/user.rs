use crate::models::NewUser;
use crate::{services::users, Config};
use anyhow::Result;
use std::path::Path;

use super::UserCommand;

pub async fn run(config_path: &Path, command: UserCommand) -> Result<()> {
    let config = Config::load(config_path)?;
    let db = config.open_database()?;

    match command {
        UserCommand::Add {
            username,
            email,
            staff,
            password,
        } => {
            let password = match password {
                Some(p) => p,
                None => std::env::var("BLOGDATA_PASSWORD")
                    .map_err(|_| anyhow::anyhow!("Pass --password or set BLOGDATA_PASSWORD"))?,
            };
            users::create_user(
                &db,
                &NewUser {
                    username,
                    email,
                    password,
                    is_staff: staff,
                },
            )?;
        }
        UserCommand::List => {
            println!("{:<20} {:<30} {:<6}", "USERNAME", "EMAIL", "STAFF");
            println!("{}", "-".repeat(58));
            for user in users::list_users(&db)? {
                let staff = if user.is_staff { "yes" } else { "no" };
                println!("{:<20} {:<30} {:<6}", user.username, user.email, staff);
            }
        }
        UserCommand::Remove { username } => {
            if users::delete_user(&db, &username)? {
                tracing::info!("User '{}' removed", username);
            } else {
                tracing::warn!("User '{}' not found", username);
            }
        }
    }

    Ok(())
}
