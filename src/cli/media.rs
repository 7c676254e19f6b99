use crate::cli::MediaCommand;
use crate::services::media::{MediaError, MediaLibrary};
use crate::services::references::ReferenceGate;
use crate::{Config, Database};
use anyhow::Result;
use std::path::Path;

pub async fn run(config_path: &Path, command: MediaCommand) -> Result<()> {
    let config = Config::load(config_path)?;
    let db = Database::open(&config.database.path)?;
    let library = MediaLibrary::sqlite(&db, ReferenceGate::new(), config.media.limits()?);

    match command {
        MediaCommand::List { limit } => {
            let items = library.list(limit, 0)?;

            println!(
                "{:<6} {:<30} {:<12} {:<12} {:<10}",
                "ID", "ORIGINAL NAME", "LARGE", "THUMB", "BYTES"
            );
            println!("{}", "-".repeat(74));
            for media in &items {
                let large = &media.sizes.large;
                let thumb = &media.sizes.thumb;
                let bytes = large.bytes + media.sizes.medium.bytes + thumb.bytes;
                println!(
                    "{:<6} {:<30} {:<12} {:<12} {:<10}",
                    media.id,
                    truncate(&media.original_name, 30),
                    format!("{}x{}", large.width, large.height),
                    format!("{}x{}", thumb.width, thumb.height),
                    bytes
                );
            }
            println!("\n{} of {} media assets", items.len(), library.count()?);
        }
        MediaCommand::Refs { id } => {
            let report = library.references(id)?;
            if report.is_empty() {
                println!("Media {} is not referenced and can be deleted", id);
            } else {
                println!("Media {} is referenced by {}", id, report);
            }
        }
        MediaCommand::Delete { id } => match library.delete(id) {
            Ok(()) => tracing::info!("Media {} deleted", id),
            Err(MediaError::Referenced(report)) => {
                anyhow::bail!("Media {} is still in use by {}", id, report)
            }
            Err(e) => return Err(e.into()),
        },
    }

    Ok(())
}

fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let kept: String = value.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}
