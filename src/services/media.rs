use crate::db::{Database, StoreError};
use crate::models::{Blob, MediaAsset, NewMediaAsset, Variant, VariantSet, VariantSize};
use crate::services::catalog::{MediaCatalog, SqliteMediaCatalog};
use crate::services::image::{self, DeriveError, DerivedImage, DerivedSet};
use crate::services::references::{ReferenceGate, ReferenceReport};
use crate::services::storage::{BlobStore, SqliteBlobStore};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

pub const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024; // 10MB
pub const DEFAULT_MAX_BATCH_FILES: usize = 20;

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("file type not allowed: {0} (only images are accepted)")]
    UnsupportedType(String),
    #[error("file too large: {size} bytes (max {max} bytes)")]
    PayloadTooLarge { size: usize, max: usize },
    #[error("too many files: {count} (max {max} per upload)")]
    TooManyFiles { count: usize, max: usize },
    #[error("no files uploaded")]
    EmptyBatch,
    #[error(transparent)]
    Decode(#[from] DeriveError),
    #[error("failed to store media: {source}")]
    StorageWrite {
        #[source]
        source: StoreError,
        /// Blobs the compensating cleanup could not remove.
        leaked_blobs: Vec<i64>,
    },
    #[error("failed to read media: {0}")]
    StorageRead(#[source] StoreError),
    /// The removal was rolled back; `removed` blobs had been deleted before the failure.
    #[error("failed to delete media, rolled back after removing {removed} of 3 blobs: {source}")]
    StorageDelete {
        removed: usize,
        #[source]
        source: StoreError,
    },
    #[error("media not found")]
    NotFound,
    #[error("media is referenced by {0}")]
    Referenced(ReferenceReport),
}

impl MediaError {
    /// Stable machine-readable name, used in batch reports and API bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedType(_) => "unsupported_type",
            Self::PayloadTooLarge { .. } | Self::TooManyFiles { .. } => "payload_too_large",
            Self::EmptyBatch => "empty_batch",
            Self::Decode(_) => "decode",
            Self::StorageWrite { .. } => "storage_write",
            Self::StorageRead(_) => "storage_read",
            Self::StorageDelete { .. } => "storage_delete",
            Self::NotFound => "not_found",
            Self::Referenced(_) => "referenced",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_file_bytes: usize,
    pub max_batch_files: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_file_bytes: DEFAULT_MAX_FILE_SIZE,
            max_batch_files: DEFAULT_MAX_BATCH_FILES,
        }
    }
}

/// One file as received from the upload form.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub original_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedUpload {
    pub original_name: String,
    pub kind: &'static str,
    pub message: String,
}

#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    pub uploaded: Vec<MediaAsset>,
    pub failed: Vec<FailedUpload>,
}

impl BatchReport {
    pub fn skipped(&self) -> usize {
        self.failed.len()
    }
}

pub fn is_image_mime(mime_type: &str) -> bool {
    mime_type.starts_with("image/")
}

/// Upload, retrieval, and audited deletion of multi-size images.
pub struct MediaLibrary {
    blobs: Arc<dyn BlobStore>,
    catalog: Arc<dyn MediaCatalog>,
    gate: ReferenceGate,
    limits: UploadLimits,
}

impl MediaLibrary {
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        catalog: Arc<dyn MediaCatalog>,
        gate: ReferenceGate,
        limits: UploadLimits,
    ) -> Self {
        Self {
            blobs,
            catalog,
            gate,
            limits,
        }
    }

    pub fn sqlite(db: &Database, gate: ReferenceGate, limits: UploadLimits) -> Self {
        Self::new(
            Arc::new(SqliteBlobStore::new(db.clone())),
            Arc::new(SqliteMediaCatalog::new(db.clone())),
            gate,
            limits,
        )
    }

    pub fn limits(&self) -> UploadLimits {
        self.limits
    }

    pub fn gate(&self) -> &ReferenceGate {
        &self.gate
    }

    /// Cheap checks that run before any decoding.
    pub fn check_upload(&self, file: &UploadFile) -> Result<(), MediaError> {
        if !is_image_mime(&file.mime_type) {
            return Err(MediaError::UnsupportedType(file.mime_type.clone()));
        }
        if file.data.len() > self.limits.max_file_bytes {
            return Err(MediaError::PayloadTooLarge {
                size: file.data.len(),
                max: self.limits.max_file_bytes,
            });
        }
        Ok(())
    }

    pub fn ingest(&self, file: &UploadFile) -> Result<MediaAsset, MediaError> {
        self.check_upload(file)?;

        let derived = image::derive_variants(&file.data)?;

        let mut written = Vec::with_capacity(3);
        let sizes = match self.store_variants(&derived, &mut written) {
            Ok(sizes) => sizes,
            Err(source) => return Err(self.abort_ingest(source, &written)),
        };

        let record = NewMediaAsset {
            filename: format!("{}.{}", Uuid::new_v4(), image::OUTPUT_EXTENSION),
            original_name: file.original_name.clone(),
            mime_type: file.mime_type.clone(),
            sizes,
        };

        match self.catalog.insert(&record) {
            Ok(media) => {
                tracing::info!(
                    media_id = media.id,
                    original_name = %media.original_name,
                    "Stored media with {} bytes across three sizes",
                    derived.large.byte_len() + derived.medium.byte_len() + derived.thumb.byte_len()
                );
                Ok(media)
            }
            Err(source) => Err(self.abort_ingest(source, &written)),
        }
    }

    /// Each file is ingested on its own; failures are reported, never fatal to the batch.
    pub fn ingest_batch(&self, files: &[UploadFile]) -> Result<BatchReport, MediaError> {
        if files.is_empty() {
            return Err(MediaError::EmptyBatch);
        }
        if files.len() > self.limits.max_batch_files {
            return Err(MediaError::TooManyFiles {
                count: files.len(),
                max: self.limits.max_batch_files,
            });
        }

        let mut report = BatchReport::default();
        for file in files {
            match self.ingest(file) {
                Ok(media) => report.uploaded.push(media),
                Err(e) => {
                    tracing::warn!(
                        original_name = %file.original_name,
                        "Skipping upload: {}",
                        e
                    );
                    report.failed.push(FailedUpload {
                        original_name: file.original_name.clone(),
                        kind: e.kind(),
                        message: e.to_string(),
                    });
                }
            }
        }
        Ok(report)
    }

    fn store_variants(
        &self,
        derived: &DerivedSet,
        written: &mut Vec<i64>,
    ) -> Result<VariantSet, StoreError> {
        let mut store = |rendition: &DerivedImage| -> Result<Variant, StoreError> {
            let storage_id = self.blobs.put(&rendition.data, image::OUTPUT_CONTENT_TYPE)?;
            written.push(storage_id);
            Ok(Variant {
                storage_id,
                width: rendition.width,
                height: rendition.height,
                bytes: rendition.byte_len(),
            })
        };

        Ok(VariantSet {
            large: store(&derived.large)?,
            medium: store(&derived.medium)?,
            thumb: store(&derived.thumb)?,
        })
    }

    /// Compensating step for a failed ingest: drop every blob already written.
    fn abort_ingest(&self, source: StoreError, written: &[i64]) -> MediaError {
        tracing::error!("Media ingest failed while persisting: {}", source);

        let mut leaked_blobs = Vec::new();
        for &blob_id in written {
            if let Err(e) = self.blobs.delete(blob_id) {
                tracing::error!(blob_id, "Cleanup could not remove orphaned blob: {}", e);
                leaked_blobs.push(blob_id);
            }
        }

        MediaError::StorageWrite {
            source,
            leaked_blobs,
        }
    }

    pub fn get(&self, id: i64) -> Result<MediaAsset, MediaError> {
        self.catalog
            .get(id)
            .map_err(MediaError::StorageRead)?
            .ok_or(MediaError::NotFound)
    }

    pub fn list(&self, limit: usize, offset: usize) -> Result<Vec<MediaAsset>, MediaError> {
        self.catalog
            .list(limit, offset)
            .map_err(MediaError::StorageRead)
    }

    pub fn count(&self) -> Result<i64, MediaError> {
        self.catalog.count().map_err(MediaError::StorageRead)
    }

    /// Bytes of one stored rendition. Unknown size names are reported as not found.
    pub fn open_variant(&self, id: i64, size: &str) -> Result<Blob, MediaError> {
        let size: VariantSize = size.parse().map_err(|_| MediaError::NotFound)?;
        let media = self.get(id)?;
        self.blobs
            .get(media.sizes.get(size).storage_id)
            .map_err(MediaError::StorageRead)?
            .ok_or(MediaError::NotFound)
    }

    pub fn update_details(
        &self,
        id: i64,
        title: &str,
        alt_text: &str,
    ) -> Result<MediaAsset, MediaError> {
        let updated = self
            .catalog
            .update_details(id, title.trim(), alt_text.trim())
            .map_err(|source| MediaError::StorageWrite {
                source,
                leaked_blobs: Vec::new(),
            })?;
        if !updated {
            return Err(MediaError::NotFound);
        }
        self.get(id)
    }

    pub fn references(&self, id: i64) -> Result<ReferenceReport, MediaError> {
        self.get(id)?;
        self.catalog.references(id).map_err(MediaError::StorageRead)
    }

    pub fn can_delete(&self, id: i64) -> Result<bool, MediaError> {
        Ok(self.references(id)?.is_empty())
    }

    /// Audit, then remove the three blobs, then the catalog record.
    ///
    /// All of it runs in one removal transaction, so a failure at any step
    /// leaves the asset and its blobs exactly as they were. The exclusive side
    /// of the reference gate is held throughout.
    pub fn delete(&self, id: i64) -> Result<(), MediaError> {
        let _guard = self.gate.exclusive();

        let media = self.get(id)?;
        let mut removal = self
            .catalog
            .begin_removal()
            .map_err(|source| MediaError::StorageDelete { removed: 0, source })?;

        let report = removal.references(id).map_err(MediaError::StorageRead)?;
        if !report.is_empty() {
            return Err(MediaError::Referenced(report));
        }

        let mut removed = 0;
        for blob_id in media.sizes.storage_ids() {
            if let Err(source) = removal.delete_blob(blob_id) {
                tracing::error!(media_id = id, blob_id, "Failed to delete blob: {}", source);
                return Err(MediaError::StorageDelete { removed, source });
            }
            removed += 1;
        }

        match removal.remove_record(id) {
            Ok(true) => {}
            Ok(false) => return Err(MediaError::NotFound),
            Err(source) => {
                tracing::error!(media_id = id, "Failed to remove media record: {}", source);
                return Err(MediaError::StorageDelete { removed, source });
            }
        }
        removal
            .commit()
            .map_err(|source| MediaError::StorageDelete { removed, source })?;

        tracing::info!(media_id = id, "Deleted media");
        Ok(())
    }
}
