use crate::services::media::DEFAULT_MAX_BATCH_FILES;
use anyhow::Result;
use std::path::PathBuf;

pub async fn run(path: PathBuf, name: Option<String>) -> Result<()> {
    let site_name = name.unwrap_or_else(|| "Aquarian Pools & Spas".to_string());
    let config_path = path.join("aquarian.toml");
    if config_path.exists() {
        anyhow::bail!("{} already exists", config_path.display());
    }

    std::fs::create_dir_all(path.join("data"))?;

    let config = format!(
        r#"[site]
title = "{}"
url = "http://localhost:3000"

[server]
host = "127.0.0.1"
port = 3000
request_timeout_secs = 120

[database]
path = "./data/aquarian.db"

[media]
max_upload_size = "10MB"
max_batch_files = {}

[auth]
# Generate with `aquarian token <secret>`
# admin_token_hash = ""
"#,
        site_name, DEFAULT_MAX_BATCH_FILES
    );

    std::fs::write(&config_path, config)?;

    tracing::info!("Created new site at {:?}", path);
    tracing::info!("Run 'aquarian token <secret>' and add the hash to [auth]");
    tracing::info!("Run 'aquarian migrate' then 'aquarian seed' to set up the database");
    tracing::info!("Run 'aquarian serve' to start the server");

    Ok(())
}
