use crate::db::{Database, StoreResult};
use crate::models::{PortfolioInput, PortfolioPost, Seo};
use crate::services::content::{
    dedup_media_ids, ensure_media_exist, load_media_links, replace_media_links, required,
    save_with_slug, ContentError, ContentResult,
};
use crate::services::references::{ReferenceGate, ReferenceKind, ReferenceSource};
use crate::services::slug::SlugScope;
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row};

const POST_COLUMNS: &str = "id, title, slug, excerpt, content, project_date, location, published, \
     seo_meta_title, seo_meta_description, seo_meta_keywords, created_at, updated_at";

fn normalize(input: PortfolioInput) -> ContentResult<PortfolioInput> {
    let title = required(input.title, "title")?;

    let project_date = match input.project_date.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => {
            let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                ContentError::Invalid(format!("Invalid project date '{}', expected YYYY-MM-DD", raw))
            })?;
            Some(date.format("%Y-%m-%d").to_string())
        }
    };

    Ok(PortfolioInput {
        title,
        excerpt: input.excerpt.trim().to_string(),
        content: input.content.trim().to_string(),
        project_date,
        location: input.location.trim().to_string(),
        media_ids: dedup_media_ids(input.media_ids),
        seo: Seo {
            meta_title: input.seo.meta_title.trim().to_string(),
            meta_description: input.seo.meta_description.trim().to_string(),
            meta_keywords: input.seo.meta_keywords.trim().to_string(),
        },
        ..input
    })
}

pub fn create_post(
    db: &Database,
    gate: &ReferenceGate,
    input: PortfolioInput,
) -> ContentResult<PortfolioPost> {
    let input = normalize(input)?;
    let _attach = gate.attach();
    ensure_media_exist(db, &input.media_ids)?;

    let id = save_with_slug(db, SlugScope::PortfolioPost, &input.title, None, |slug| {
        write_post(db, None, &input, slug)
    })?;
    tracing::info!(post_id = id, "Created portfolio post");
    get_post(db, id)?.ok_or(ContentError::NotFound)
}

pub fn update_post(
    db: &Database,
    gate: &ReferenceGate,
    id: i64,
    input: PortfolioInput,
) -> ContentResult<PortfolioPost> {
    let input = normalize(input)?;
    let _attach = gate.attach();
    let current = get_post(db, id)?.ok_or(ContentError::NotFound)?;
    ensure_media_exist(db, &input.media_ids)?;

    if current.title != input.title {
        save_with_slug(db, SlugScope::PortfolioPost, &input.title, Some(id), |slug| {
            write_post(db, Some(id), &input, slug)
        })?;
    } else {
        write_post(db, Some(id), &input, &current.slug)?;
    }
    get_post(db, id)?.ok_or(ContentError::NotFound)
}

fn write_post(
    db: &Database,
    id: Option<i64>,
    input: &PortfolioInput,
    slug: &str,
) -> StoreResult<i64> {
    let mut conn = db.get()?;
    let tx = conn.transaction()?;

    let id = match id {
        Some(id) => {
            tx.execute(
                r#"
                UPDATE portfolio_posts SET title = ?, slug = ?, excerpt = ?, content = ?,
                    project_date = ?, location = ?, published = ?, seo_meta_title = ?,
                    seo_meta_description = ?, seo_meta_keywords = ?,
                    updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                WHERE id = ?
                "#,
                rusqlite::params![
                    input.title,
                    slug,
                    input.excerpt,
                    input.content,
                    input.project_date,
                    input.location,
                    input.published,
                    input.seo.meta_title,
                    input.seo.meta_description,
                    input.seo.meta_keywords,
                    id,
                ],
            )?;
            id
        }
        None => {
            tx.execute(
                r#"
                INSERT INTO portfolio_posts (title, slug, excerpt, content, project_date, location,
                    published, seo_meta_title, seo_meta_description, seo_meta_keywords)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
                rusqlite::params![
                    input.title,
                    slug,
                    input.excerpt,
                    input.content,
                    input.project_date,
                    input.location,
                    input.published,
                    input.seo.meta_title,
                    input.seo.meta_description,
                    input.seo.meta_keywords,
                ],
            )?;
            tx.last_insert_rowid()
        }
    };

    replace_media_links(&tx, "portfolio_media", "post_id", id, &input.media_ids)?;

    tx.commit()?;
    Ok(id)
}

fn row_to_post(row: &Row) -> rusqlite::Result<PortfolioPost> {
    Ok(PortfolioPost {
        id: row.get(0)?,
        title: row.get(1)?,
        slug: row.get(2)?,
        excerpt: row.get(3)?,
        content: row.get(4)?,
        project_date: row.get(5)?,
        location: row.get(6)?,
        published: row.get(7)?,
        media_ids: Vec::new(),
        seo: Seo {
            meta_title: row.get(8)?,
            meta_description: row.get(9)?,
            meta_keywords: row.get(10)?,
        },
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

fn with_media(db: &Database, mut post: PortfolioPost) -> StoreResult<PortfolioPost> {
    post.media_ids = load_media_links(db, "portfolio_media", "post_id", post.id)?;
    Ok(post)
}

pub fn get_post(db: &Database, id: i64) -> StoreResult<Option<PortfolioPost>> {
    let post = {
        let conn = db.get()?;
        conn.query_row(
            &format!("SELECT {} FROM portfolio_posts WHERE id = ?", POST_COLUMNS),
            [id],
            row_to_post,
        )
        .optional()?
    };
    post.map(|p| with_media(db, p)).transpose()
}

pub fn get_post_by_slug(db: &Database, slug: &str) -> StoreResult<Option<PortfolioPost>> {
    let post = {
        let conn = db.get()?;
        conn.query_row(
            &format!("SELECT {} FROM portfolio_posts WHERE slug = ?", POST_COLUMNS),
            [slug],
            row_to_post,
        )
        .optional()?
    };
    post.map(|p| with_media(db, p)).transpose()
}

pub fn list_posts(
    db: &Database,
    published_only: bool,
    limit: usize,
    offset: usize,
) -> StoreResult<Vec<PortfolioPost>> {
    let posts = {
        let conn = db.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM portfolio_posts WHERE (?1 = 0 OR published = 1) \
             ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3",
            POST_COLUMNS
        ))?;
        let rows = stmt
            .query_map(
                rusqlite::params![published_only, limit as i64, offset as i64],
                row_to_post,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        rows
    };
    posts.into_iter().map(|p| with_media(db, p)).collect()
}

pub fn count_posts(db: &Database, published_only: bool) -> StoreResult<i64> {
    let conn = db.get()?;
    let count = conn.query_row(
        "SELECT COUNT(*) FROM portfolio_posts WHERE (?1 = 0 OR published = 1)",
        [published_only],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn delete_post(db: &Database, id: i64) -> StoreResult<bool> {
    let conn = db.get()?;
    let removed = conn.execute("DELETE FROM portfolio_posts WHERE id = ?", [id])?;
    if removed > 0 {
        tracing::info!(post_id = id, "Deleted portfolio post");
    }
    Ok(removed > 0)
}

pub struct PortfolioReferences;

impl ReferenceSource for PortfolioReferences {
    fn kind(&self) -> ReferenceKind {
        ReferenceKind::PortfolioPost
    }

    fn count_references(&self, conn: &Connection, media_id: i64) -> StoreResult<u64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(DISTINCT post_id) FROM portfolio_media WHERE media_id = ?",
            [media_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
