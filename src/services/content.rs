use crate::db::{Database, StoreError, StoreResult};
use crate::services::slug::{assign_slug, SlugError, SlugScope, TableSlugIndex};
use rusqlite::Connection;

/// Failure saving or loading products, portfolio posts, settings, or contacts.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{0}")]
    Invalid(String),
    #[error("not found")]
    NotFound,
    #[error("media {0} does not exist")]
    UnknownMedia(i64),
    #[error(transparent)]
    Slug(#[from] SlugError),
    #[error("slug '{0}' is still taken after reassignment")]
    SlugConflict(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<rusqlite::Error> for ContentError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Store(err.into())
    }
}

pub type ContentResult<T> = Result<T, ContentError>;

/// Assign a slug for `title` and hand it to `write`.
///
/// The UNIQUE index on the slug column is the final arbiter. When a concurrent
/// writer claims the slug between assignment and write, assignment runs once
/// more against the refreshed table before giving up.
pub(crate) fn save_with_slug<T>(
    db: &Database,
    scope: SlugScope,
    title: &str,
    exclude_id: Option<i64>,
    mut write: impl FnMut(&str) -> StoreResult<T>,
) -> ContentResult<T> {
    let index = TableSlugIndex::new(db, scope);
    let column = format!("{}.slug", scope.table());

    let mut retried = false;
    loop {
        let slug = assign_slug(&index, title, exclude_id)?;
        match write(&slug) {
            Ok(value) => return Ok(value),
            Err(e) if e.is_unique_violation(&column) => {
                if retried {
                    return Err(ContentError::SlugConflict(slug));
                }
                tracing::warn!(slug = %slug, "Slug claimed concurrently, reassigning");
                retried = true;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

pub(crate) fn ensure_media_exist(db: &Database, media_ids: &[i64]) -> ContentResult<()> {
    if media_ids.is_empty() {
        return Ok(());
    }
    let conn = db.get()?;
    let mut stmt = conn.prepare("SELECT EXISTS(SELECT 1 FROM media WHERE id = ?)")?;
    for &id in media_ids {
        let exists: bool = stmt.query_row([id], |row| row.get(0))?;
        if !exists {
            return Err(ContentError::UnknownMedia(id));
        }
    }
    Ok(())
}

/// Replace the ordered media list stored in `table` for `owner_id`.
pub(crate) fn replace_media_links(
    conn: &Connection,
    table: &str,
    owner_column: &str,
    owner_id: i64,
    media_ids: &[i64],
) -> rusqlite::Result<()> {
    conn.execute(
        &format!("DELETE FROM {} WHERE {} = ?", table, owner_column),
        [owner_id],
    )?;
    let mut stmt = conn.prepare(&format!(
        "INSERT INTO {} ({}, media_id, position) VALUES (?, ?, ?)",
        table, owner_column
    ))?;
    for (position, media_id) in media_ids.iter().enumerate() {
        stmt.execute((owner_id, media_id, position as i64))?;
    }
    Ok(())
}

pub(crate) fn load_media_links(
    db: &Database,
    table: &str,
    owner_column: &str,
    owner_id: i64,
) -> StoreResult<Vec<i64>> {
    let conn = db.get()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT media_id FROM {} WHERE {} = ? ORDER BY position",
        table, owner_column
    ))?;
    let ids = stmt
        .query_map([owner_id], |row| row.get(0))?
        .collect::<Result<Vec<i64>, _>>()?;
    Ok(ids)
}

/// Drop blanks and duplicates, keeping first-seen order.
pub(crate) fn dedup_media_ids(ids: Vec<i64>) -> Vec<i64> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

pub(crate) fn required(value: String, field: &'static str) -> ContentResult<String> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(ContentError::Required(field));
    }
    Ok(value)
}

pub(crate) fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}
