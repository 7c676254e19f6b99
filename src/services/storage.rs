use crate::db::{Database, StoreResult};
use crate::models::Blob;
use rusqlite::OptionalExtension;

/// Opaque byte payloads addressed by id.
pub trait BlobStore: Send + Sync {
    fn put(&self, data: &[u8], content_type: &str) -> StoreResult<i64>;

    fn get(&self, id: i64) -> StoreResult<Option<Blob>>;

    /// Returns whether a blob was actually removed.
    fn delete(&self, id: i64) -> StoreResult<bool>;
}

/// Blobs kept inline in the `media_storage` table.
#[derive(Clone)]
pub struct SqliteBlobStore {
    db: Database,
}

impl SqliteBlobStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn count(&self) -> StoreResult<i64> {
        let conn = self.db.get()?;
        let count = conn.query_row("SELECT COUNT(*) FROM media_storage", [], |row| row.get(0))?;
        Ok(count)
    }
}

impl BlobStore for SqliteBlobStore {
    fn put(&self, data: &[u8], content_type: &str) -> StoreResult<i64> {
        let conn = self.db.get()?;
        conn.execute(
            "INSERT INTO media_storage (data, content_type) VALUES (?, ?)",
            (data, content_type),
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn get(&self, id: i64) -> StoreResult<Option<Blob>> {
        let conn = self.db.get()?;
        let blob = conn
            .query_row(
                "SELECT id, data, content_type, created_at FROM media_storage WHERE id = ?",
                [id],
                |row| {
                    Ok(Blob {
                        id: row.get(0)?,
                        data: row.get(1)?,
                        content_type: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(blob)
    }

    fn delete(&self, id: i64) -> StoreResult<bool> {
        let conn = self.db.get()?;
        let removed = conn.execute("DELETE FROM media_storage WHERE id = ?", [id])?;
        Ok(removed > 0)
    }
}
