use crate::services::media::{UploadLimits, DEFAULT_MAX_BATCH_FILES};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    pub title: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upper bound on a single request, uploads included.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MediaConfig {
    #[serde(default = "default_max_upload")]
    pub max_upload_size: String,
    #[serde(default = "default_max_batch_files")]
    pub max_batch_files: usize,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            max_upload_size: default_max_upload(),
            max_batch_files: default_max_batch_files(),
        }
    }
}

impl MediaConfig {
    pub fn limits(&self) -> Result<UploadLimits> {
        Ok(UploadLimits {
            max_file_bytes: parse_size(&self.max_upload_size)?,
            max_batch_files: self.max_batch_files,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Hex SHA-256 of the admin bearer token. Admin routes are closed while unset.
    #[serde(default)]
    pub admin_token_hash: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout() -> u64 {
    120
}

fn default_max_upload() -> String {
    "10MB".to_string()
}

fn default_max_batch_files() -> usize {
    DEFAULT_MAX_BATCH_FILES
}

/// Parse sizes such as `10MB`, `512KB`, `1GB`, or a plain byte count. Units are binary.
pub fn parse_size(raw: &str) -> Result<usize> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split);
    let value: usize = digits
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid size '{}'", raw))?;

    let multiplier: usize = match unit.trim().to_ascii_uppercase().as_str() {
        "" | "B" => 1,
        "K" | "KB" | "KIB" => 1024,
        "M" | "MB" | "MIB" => 1024 * 1024,
        "G" | "GB" | "GIB" => 1024 * 1024 * 1024,
        other => anyhow::bail!("Unknown size unit '{}' in '{}'", other, raw),
    };

    value
        .checked_mul(multiplier)
        .ok_or_else(|| anyhow::anyhow!("Size '{}' is too large", raw))
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!(
                "Could not read config file '{}': {}. Run `aquarian init` to create one.",
                path.display(),
                e
            )
        })?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let limits = self.media.limits()?;
        if limits.max_file_bytes == 0 {
            anyhow::bail!("media.max_upload_size must be greater than 0");
        }
        if self.media.max_batch_files == 0 {
            anyhow::bail!("media.max_batch_files must be greater than 0");
        }
        if self.server.request_timeout_secs == 0 {
            anyhow::bail!("server.request_timeout_secs must be greater than 0");
        }
        if let Some(hash) = &self.auth.admin_token_hash {
            if hash.len() != 64 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
                anyhow::bail!("auth.admin_token_hash must be a 64 character hex SHA-256 digest");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size_units() {
        assert_eq!(parse_size("10MB").unwrap(), 10 * 1024 * 1024);
        assert_eq!(parse_size("512KB").unwrap(), 512 * 1024);
        assert_eq!(parse_size("2048").unwrap(), 2048);
        assert_eq!(parse_size(" 1 gb ").unwrap(), 1024 * 1024 * 1024);
    }

    #[test]
    fn test_parse_size_rejects_garbage() {
        assert!(parse_size("ten megabytes").is_err());
        assert!(parse_size("10XB").is_err());
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [site]
            title = "Aquarian"

            [database]
            path = "./data/aquarian.db"
            "#,
        )
        .unwrap();
        config.validate().unwrap();

        let limits = config.media.limits().unwrap();
        assert_eq!(limits.max_file_bytes, 10 * 1024 * 1024);
        assert_eq!(limits.max_batch_files, 20);
        assert_eq!(config.server.port, 3000);
        assert!(config.auth.admin_token_hash.is_none());
    }

    #[test]
    fn test_validate_rejects_bad_token_hash() {
        let config: Config = toml::from_str(
            r#"
            [site]
            title = "Aquarian"

            [database]
            path = "./data/aquarian.db"

            [auth]
            admin_token_hash = "not-a-digest"
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }
}
