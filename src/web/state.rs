use crate::services::media::MediaLibrary;
use crate::services::references::ReferenceGate;
use crate::{Config, Database};
use anyhow::Result;

pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub media: MediaLibrary,
    pub gate: ReferenceGate,
}

impl AppState {
    pub fn new(config: Config, db: Database) -> Result<Self> {
        let gate = ReferenceGate::new();
        let limits = config.media.limits()?;
        let media = MediaLibrary::sqlite(&db, gate.clone(), limits);

        Ok(Self {
            config,
            db,
            media,
            gate,
        })
    }

    /// Largest request body the upload route should accept: a full batch plus form overhead.
    pub fn upload_body_limit(&self) -> usize {
        let limits = self.media.limits();
        limits
            .max_file_bytes
            .saturating_mul(limits.max_batch_files)
            .saturating_add(1024 * 1024)
    }
}
