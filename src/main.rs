use blogdata::cli::{Cli, Commands};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blogdata=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init { path }) => {
            blogdata::cli::init::run(path).await?;
        }
        Some(Commands::Migrate { status }) => {
            blogdata::cli::migrate::run(&cli.config, status).await?;
        }
        Some(Commands::User { command }) => {
            blogdata::cli::user::run(&cli.config, command).await?;
        }
        Some(Commands::Tags { command }) => {
            blogdata::cli::tags::run(&cli.config, command).await?;
        }
        Some(Commands::Posts { command }) => {
            blogdata::cli::posts::run(&cli.config, command).await?;
        }
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
        }
    }

    Ok(())
}
