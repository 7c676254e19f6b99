use crate::db::{Database, StoreResult};
use crate::models::{MediaAsset, NewMediaAsset, Variant, VariantSet};
use crate::services::references::{ReferenceAuditor, ReferenceReport};
use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{OptionalExtension, Row};

/// Durable records binding one upload to its three stored variants.
pub trait MediaCatalog: Send + Sync {
    fn insert(&self, asset: &NewMediaAsset) -> StoreResult<MediaAsset>;

    fn get(&self, id: i64) -> StoreResult<Option<MediaAsset>>;

    fn list(&self, limit: usize, offset: usize) -> StoreResult<Vec<MediaAsset>>;

    fn count(&self) -> StoreResult<i64>;

    /// Updates cosmetic fields only. Returns `false` when no record matched.
    fn update_details(&self, id: i64, title: &str, alt_text: &str) -> StoreResult<bool>;

    /// Live references to `id` from content and settings.
    fn references(&self, id: i64) -> StoreResult<ReferenceReport>;

    /// Open an all-or-nothing removal. Nothing it does persists unless it is
    /// committed; dropping it rolls everything back.
    fn begin_removal(&self) -> StoreResult<Box<dyn MediaRemoval + '_>>;
}

/// One media deletion held open as a single write transaction.
pub trait MediaRemoval {
    fn references(&mut self, media_id: i64) -> StoreResult<ReferenceReport>;

    /// Returns whether a blob was actually removed.
    fn delete_blob(&mut self, blob_id: i64) -> StoreResult<bool>;

    /// Returns `false` when no record matched.
    fn remove_record(&mut self, media_id: i64) -> StoreResult<bool>;

    fn commit(self: Box<Self>) -> StoreResult<()>;
}

pub struct SqliteMediaCatalog {
    db: Database,
    auditor: ReferenceAuditor,
}

impl SqliteMediaCatalog {
    pub fn new(db: Database) -> Self {
        Self::with_auditor(db, ReferenceAuditor::sqlite())
    }

    pub fn with_auditor(db: Database, auditor: ReferenceAuditor) -> Self {
        Self { db, auditor }
    }
}

const MEDIA_COLUMNS: &str = "id, filename, original_name, mime_type, title, alt_text, \
     large_storage_id, large_width, large_height, large_bytes, \
     medium_storage_id, medium_width, medium_height, medium_bytes, \
     thumb_storage_id, thumb_width, thumb_height, thumb_bytes, created_at";

fn variant_at(row: &Row, start: usize) -> rusqlite::Result<Variant> {
    Ok(Variant {
        storage_id: row.get(start)?,
        width: row.get(start + 1)?,
        height: row.get(start + 2)?,
        bytes: row.get::<_, i64>(start + 3)? as u64,
    })
}

fn row_to_media(row: &Row) -> rusqlite::Result<MediaAsset> {
    Ok(MediaAsset {
        id: row.get(0)?,
        filename: row.get(1)?,
        original_name: row.get(2)?,
        mime_type: row.get(3)?,
        title: row.get(4)?,
        alt_text: row.get(5)?,
        sizes: VariantSet {
            large: variant_at(row, 6)?,
            medium: variant_at(row, 10)?,
            thumb: variant_at(row, 14)?,
        },
        created_at: row.get(18)?,
    })
}

impl MediaCatalog for SqliteMediaCatalog {
    fn insert(&self, asset: &NewMediaAsset) -> StoreResult<MediaAsset> {
        let conn = self.db.get()?;
        let VariantSet {
            large,
            medium,
            thumb,
        } = &asset.sizes;
        conn.execute(
            r#"
            INSERT INTO media (filename, original_name, mime_type,
                large_storage_id, large_width, large_height, large_bytes,
                medium_storage_id, medium_width, medium_height, medium_bytes,
                thumb_storage_id, thumb_width, thumb_height, thumb_bytes)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            rusqlite::params![
                asset.filename,
                asset.original_name,
                asset.mime_type,
                large.storage_id,
                large.width,
                large.height,
                large.bytes as i64,
                medium.storage_id,
                medium.width,
                medium.height,
                medium.bytes as i64,
                thumb.storage_id,
                thumb.width,
                thumb.height,
                thumb.bytes as i64,
            ],
        )?;

        let id = conn.last_insert_rowid();
        let media = conn.query_row(
            &format!("SELECT {} FROM media WHERE id = ?", MEDIA_COLUMNS),
            [id],
            row_to_media,
        )?;
        Ok(media)
    }

    fn get(&self, id: i64) -> StoreResult<Option<MediaAsset>> {
        let conn = self.db.get()?;
        let media = conn
            .query_row(
                &format!("SELECT {} FROM media WHERE id = ?", MEDIA_COLUMNS),
                [id],
                row_to_media,
            )
            .optional()?;
        Ok(media)
    }

    fn list(&self, limit: usize, offset: usize) -> StoreResult<Vec<MediaAsset>> {
        let conn = self.db.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM media ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
            MEDIA_COLUMNS
        ))?;
        let media = stmt
            .query_map((limit as i64, offset as i64), row_to_media)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(media)
    }

    fn count(&self) -> StoreResult<i64> {
        let conn = self.db.get()?;
        let count = conn.query_row("SELECT COUNT(*) FROM media", [], |row| row.get(0))?;
        Ok(count)
    }

    fn update_details(&self, id: i64, title: &str, alt_text: &str) -> StoreResult<bool> {
        let conn = self.db.get()?;
        let updated = conn.execute(
            "UPDATE media SET title = ?, alt_text = ? WHERE id = ?",
            (title, alt_text, id),
        )?;
        Ok(updated > 0)
    }

    fn references(&self, id: i64) -> StoreResult<ReferenceReport> {
        let conn = self.db.get()?;
        self.auditor.audit(&conn, id)
    }

    fn begin_removal(&self) -> StoreResult<Box<dyn MediaRemoval + '_>> {
        let conn = self.db.get()?;
        // Takes the database write lock up front, so no other connection or
        // process can add a reference until this removal ends.
        conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(Box::new(SqliteRemoval {
            conn,
            auditor: &self.auditor,
            open: true,
        }))
    }
}

/// Blob rows and the catalog row live in the same database, so one
/// transaction covers the audit and every delete.
struct SqliteRemoval<'a> {
    conn: PooledConnection<SqliteConnectionManager>,
    auditor: &'a ReferenceAuditor,
    open: bool,
}

impl MediaRemoval for SqliteRemoval<'_> {
    fn references(&mut self, media_id: i64) -> StoreResult<ReferenceReport> {
        self.auditor.audit(&self.conn, media_id)
    }

    fn delete_blob(&mut self, blob_id: i64) -> StoreResult<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM media_storage WHERE id = ?", [blob_id])?;
        Ok(removed > 0)
    }

    fn remove_record(&mut self, media_id: i64) -> StoreResult<bool> {
        let removed = self.conn.execute("DELETE FROM media WHERE id = ?", [media_id])?;
        Ok(removed > 0)
    }

    fn commit(mut self: Box<Self>) -> StoreResult<()> {
        self.conn.execute_batch("COMMIT")?;
        self.open = false;
        Ok(())
    }
}

impl Drop for SqliteRemoval<'_> {
    fn drop(&mut self) {
        if self.open {
            if let Err(e) = self.conn.execute_batch("ROLLBACK") {
                tracing::error!("Failed to roll back media removal: {}", e);
            }
        }
    }
}
