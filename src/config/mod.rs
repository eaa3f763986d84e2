use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub listing: ListingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListingConfig {
    /// How many entries the popularity listings return by default.
    #[serde(default = "default_popular_limit")]
    pub popular_limit: usize,
    #[serde(default = "default_posts_per_page")]
    pub posts_per_page: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            popular_limit: default_popular_limit(),
            posts_per_page: default_posts_per_page(),
        }
    }
}

fn default_pool_size() -> u32 {
    10
}

fn default_popular_limit() -> usize {
    5
}

fn default_posts_per_page() -> usize {
    10
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Could not read config file '{}': {}", path.display(), e)
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.database.pool_size == 0 {
            anyhow::bail!("database.pool_size must be greater than 0");
        }
        if self.listing.popular_limit == 0 {
            anyhow::bail!("listing.popular_limit must be greater than 0");
        }
        if self.listing.posts_per_page == 0 {
            anyhow::bail!("listing.posts_per_page must be greater than 0");
        }
        if self.listing.posts_per_page > 100 {
            anyhow::bail!("listing.posts_per_page must be 100 or less");
        }
        Ok(())
    }

    pub fn open_database(&self) -> Result<crate::Database> {
        crate::Database::open(&self.database.path, self.database.pool_size)
    }
}
