use anyhow::Result;
use std::path::PathBuf;

pub async fn run(path: PathBuf) -> Result<()> {
    std::fs::create_dir_all(path.join("data"))?;

    let config_path = path.join("blogdata.toml");
    if config_path.exists() {
        anyhow::bail!("{} already exists", config_path.display());
    }

    let config = r#"[database]
path = "./data/blog.db"
pool_size = 10

[listing]
popular_limit = 5
posts_per_page = 10
"#;
    std::fs::write(&config_path, config)?;

    tracing::info!("Wrote {}", config_path.display());
    println!("Run `blogdata migrate` to create the schema.");
    Ok(())
}
