use crate::Config;
use anyhow::Result;
use std::path::Path;

pub async fn run(config_path: &Path, status: bool) -> Result<()> {
    let config = Config::load(config_path)?;
    let db = config.open_database()?;

    if !status {
        db.migrate()?;
        tracing::info!("Migrations complete");
        return Ok(());
    }

    println!("{:<10} {}", "VERSION", "APPLIED");
    println!("{}", "-".repeat(40));
    for (version, applied_at) in db.migration_status()? {
        let applied = applied_at.unwrap_or_else(|| "pending".to_string());
        println!("{:<10} {}", format!("{:03}", version), applied);
    }
    Ok(())
}
