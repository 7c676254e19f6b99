use crate::db::MIGRATION_DESCRIPTIONS;
use crate::services::storage::SqliteBlobStore;
use crate::{Config, Database};
use anyhow::Result;
use std::path::Path;

#[derive(Debug)]
enum CheckStatus {
    Ok,
    Warn,
    Fail,
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckStatus::Ok => write!(f, "\x1b[32m✓ OK\x1b[0m"),
            CheckStatus::Warn => write!(f, "\x1b[33m⚠ WARN\x1b[0m"),
            CheckStatus::Fail => write!(f, "\x1b[31m✗ FAIL\x1b[0m"),
        }
    }
}

struct CheckResult {
    name: &'static str,
    status: CheckStatus,
    detail: String,
}

impl CheckResult {
    fn new(name: &'static str, status: CheckStatus, detail: impl Into<String>) -> Self {
        Self {
            name,
            status,
            detail: detail.into(),
        }
    }
}

pub async fn run(config_path: &Path) -> Result<()> {
    println!("\n  Aquarian Check\n");

    let mut results = Vec::new();

    let config = match Config::load(config_path) {
        Ok(c) => {
            results.push(CheckResult::new(
                "Configuration",
                CheckStatus::Ok,
                format!("Loaded from {}", config_path.display()),
            ));
            c
        }
        Err(e) => {
            results.push(CheckResult::new(
                "Configuration",
                CheckStatus::Fail,
                format!("{}", e),
            ));
            return finish(&results);
        }
    };

    results.push(match &config.auth.admin_token_hash {
        Some(_) => CheckResult::new("Admin token", CheckStatus::Ok, "Configured"),
        None => CheckResult::new(
            "Admin token",
            CheckStatus::Warn,
            "Not set; admin routes are closed. Run `aquarian token <secret>`",
        ),
    });

    let db = match Database::open(&config.database.path) {
        Ok(db) => {
            results.push(CheckResult::new(
                "Database",
                CheckStatus::Ok,
                config.database.path.clone(),
            ));
            db
        }
        Err(e) => {
            results.push(CheckResult::new(
                "Database",
                CheckStatus::Fail,
                format!("Cannot open {}: {}", config.database.path, e),
            ));
            return finish(&results);
        }
    };

    let statuses = db.get_migration_status()?;
    let pending = statuses.iter().filter(|(_, ts)| ts.is_none()).count();
    results.push(if pending == 0 {
        CheckResult::new(
            "Migrations",
            CheckStatus::Ok,
            format!("{} of {} applied", statuses.len(), MIGRATION_DESCRIPTIONS.len()),
        )
    } else {
        CheckResult::new(
            "Migrations",
            CheckStatus::Fail,
            format!("{} pending. Run `aquarian migrate`", pending),
        )
    });

    if pending == 0 {
        match SqliteBlobStore::new(db.clone()).count() {
            Ok(count) => results.push(CheckResult::new(
                "Media storage",
                CheckStatus::Ok,
                format!("{} stored blobs", count),
            )),
            Err(e) => results.push(CheckResult::new(
                "Media storage",
                CheckStatus::Fail,
                format!("{}", e),
            )),
        }
    }

    finish(&results)
}

fn finish(results: &[CheckResult]) -> Result<()> {
    for r in results {
        println!("  {:<16} {:<18} {}", r.name, r.status, r.detail);
    }
    println!();

    if results.iter().any(|r| matches!(r.status, CheckStatus::Fail)) {
        anyhow::bail!("Some checks failed");
    }
    Ok(())
}
