pub mod init;
pub mod migrate;
pub mod posts;
pub mod tags;
pub mod user;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "blogdata")]
#[command(version)]
#[command(about = "Inspect and maintain a blog database", long_about = None)]
pub struct Cli {
    #[arg(short, long, default_value = "blogdata.toml", env = "BLOGDATA_CONFIG")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a starter config file and data directory
    Init {
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Apply pending schema migrations
    Migrate {
        #[arg(long)]
        status: bool,
    },
    User {
        #[command(subcommand)]
        command: UserCommand,
    },
    Tags {
        #[command(subcommand)]
        command: TagsCommand,
    },
    Posts {
        #[command(subcommand)]
        command: PostsCommand,
    },
}

#[derive(Subcommand)]
pub enum UserCommand {
    Add {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        staff: bool,
        #[arg(long)]
        password: Option<String>,
    },
    List,
    Remove {
        username: String,
    },
}

#[derive(Subcommand)]
pub enum TagsCommand {
    List,
    /// Tags ordered by how many posts carry them
    Popular {
        #[arg(short, long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum PostsCommand {
    /// Newest posts with author, tags, likes and comment counts
    List {
        #[arg(short, long)]
        tag: Option<String>,
        #[arg(short, long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Most liked posts with their comment counts
    Popular {
        #[arg(short, long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },
}
