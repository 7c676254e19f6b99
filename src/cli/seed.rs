use crate::services::settings;
use crate::{Config, Database};
use anyhow::Result;
use std::path::Path;

pub async fn run(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)?;
    let db = Database::open(&config.database.path)?;
    db.migrate()?;

    if settings::seed_defaults(&db)? {
        tracing::info!("Default settings created");
    } else {
        tracing::info!("Settings already exist, nothing to seed");
    }

    Ok(())
}
