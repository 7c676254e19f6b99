use crate::db::{Database, StoreResult};
use crate::models::{Product, ProductInput, Seo};
use crate::services::content::{
    dedup_media_ids, ensure_media_exist, load_media_links, replace_media_links, required,
    save_with_slug, ContentError, ContentResult,
};
use crate::services::references::{ReferenceGate, ReferenceKind, ReferenceSource};
use crate::services::slug::SlugScope;
use rusqlite::{Connection, OptionalExtension, Row};

const PRODUCT_COLUMNS: &str = "id, name, slug, short_description, description, price, featured, \
     published, seo_meta_title, seo_meta_description, seo_meta_keywords, created_at, updated_at";

/// Sizes may arrive as a list, a comma-separated string, or a mix of both.
pub fn parse_sizes(raw: &[String]) -> Vec<String> {
    raw.iter()
        .flat_map(|entry| entry.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn normalize(input: ProductInput) -> ContentResult<ProductInput> {
    let name = required(input.name, "name")?;
    if let Some(price) = input.price {
        if !price.is_finite() || price < 0.0 {
            return Err(ContentError::Invalid(
                "Price must be a positive number".to_string(),
            ));
        }
    }
    Ok(ProductInput {
        name,
        short_description: input.short_description.trim().to_string(),
        description: input.description.trim().to_string(),
        sizes: parse_sizes(&input.sizes),
        media_ids: dedup_media_ids(input.media_ids),
        seo: Seo {
            meta_title: input.seo.meta_title.trim().to_string(),
            meta_description: input.seo.meta_description.trim().to_string(),
            meta_keywords: input.seo.meta_keywords.trim().to_string(),
        },
        ..input
    })
}

pub fn create_product(
    db: &Database,
    gate: &ReferenceGate,
    input: ProductInput,
) -> ContentResult<Product> {
    let input = normalize(input)?;
    let _attach = gate.attach();
    ensure_media_exist(db, &input.media_ids)?;

    let id = save_with_slug(db, SlugScope::Product, &input.name, None, |slug| {
        write_product(db, None, &input, slug)
    })?;
    tracing::info!(product_id = id, "Created product");
    get_product(db, id)?.ok_or(ContentError::NotFound)
}

/// The slug is reassigned only when the name actually changed.
pub fn update_product(
    db: &Database,
    gate: &ReferenceGate,
    id: i64,
    input: ProductInput,
) -> ContentResult<Product> {
    let input = normalize(input)?;
    let _attach = gate.attach();
    let current = get_product(db, id)?.ok_or(ContentError::NotFound)?;
    ensure_media_exist(db, &input.media_ids)?;

    if current.name != input.name {
        save_with_slug(db, SlugScope::Product, &input.name, Some(id), |slug| {
            write_product(db, Some(id), &input, slug)
        })?;
    } else {
        write_product(db, Some(id), &input, &current.slug)?;
    }
    get_product(db, id)?.ok_or(ContentError::NotFound)
}

fn write_product(
    db: &Database,
    id: Option<i64>,
    input: &ProductInput,
    slug: &str,
) -> StoreResult<i64> {
    let mut conn = db.get()?;
    let tx = conn.transaction()?;

    let id = match id {
        Some(id) => {
            tx.execute(
                r#"
                UPDATE products SET name = ?, slug = ?, short_description = ?, description = ?,
                    price = ?, featured = ?, published = ?, seo_meta_title = ?,
                    seo_meta_description = ?, seo_meta_keywords = ?,
                    updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                WHERE id = ?
                "#,
                rusqlite::params![
                    input.name,
                    slug,
                    input.short_description,
                    input.description,
                    input.price,
                    input.featured,
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
                INSERT INTO products (name, slug, short_description, description, price, featured,
                    published, seo_meta_title, seo_meta_description, seo_meta_keywords)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
                rusqlite::params![
                    input.name,
                    slug,
                    input.short_description,
                    input.description,
                    input.price,
                    input.featured,
                    input.published,
                    input.seo.meta_title,
                    input.seo.meta_description,
                    input.seo.meta_keywords,
                ],
            )?;
            tx.last_insert_rowid()
        }
    };

    replace_media_links(&tx, "product_media", "product_id", id, &input.media_ids)?;

    tx.execute("DELETE FROM product_sizes WHERE product_id = ?", [id])?;
    for (position, label) in input.sizes.iter().enumerate() {
        tx.execute(
            "INSERT INTO product_sizes (product_id, label, position) VALUES (?, ?, ?)",
            (id, label, position as i64),
        )?;
    }

    tx.commit()?;
    Ok(id)
}

fn row_to_product(row: &Row) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        short_description: row.get(3)?,
        description: row.get(4)?,
        price: row.get(5)?,
        featured: row.get(6)?,
        published: row.get(7)?,
        media_ids: Vec::new(),
        sizes: Vec::new(),
        seo: Seo {
            meta_title: row.get(8)?,
            meta_description: row.get(9)?,
            meta_keywords: row.get(10)?,
        },
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

fn enrich(db: &Database, mut product: Product) -> StoreResult<Product> {
    product.media_ids = load_media_links(db, "product_media", "product_id", product.id)?;

    let conn = db.get()?;
    let mut stmt =
        conn.prepare("SELECT label FROM product_sizes WHERE product_id = ? ORDER BY position")?;
    product.sizes = stmt
        .query_map([product.id], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(product)
}

fn find_one<P: rusqlite::ToSql>(
    db: &Database,
    column: &str,
    value: P,
) -> StoreResult<Option<Product>> {
    let product = {
        let conn = db.get()?;
        conn.query_row(
            &format!("SELECT {} FROM products WHERE {} = ?", PRODUCT_COLUMNS, column),
            [value],
            row_to_product,
        )
        .optional()?
    };
    product.map(|p| enrich(db, p)).transpose()
}

pub fn get_product(db: &Database, id: i64) -> StoreResult<Option<Product>> {
    find_one(db, "id", id)
}

pub fn get_product_by_slug(db: &Database, slug: &str) -> StoreResult<Option<Product>> {
    find_one(db, "slug", slug)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProductFilter {
    pub published_only: bool,
    pub featured_only: bool,
}

pub fn list_products(
    db: &Database,
    filter: ProductFilter,
    limit: usize,
    offset: usize,
) -> StoreResult<Vec<Product>> {
    let products = {
        let conn = db.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM products WHERE (?1 = 0 OR published = 1) AND (?2 = 0 OR featured = 1) \
             ORDER BY created_at DESC, id DESC LIMIT ?3 OFFSET ?4",
            PRODUCT_COLUMNS
        ))?;
        let rows = stmt
            .query_map(
                rusqlite::params![
                    filter.published_only,
                    filter.featured_only,
                    limit as i64,
                    offset as i64
                ],
                row_to_product,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        rows
    };
    products.into_iter().map(|p| enrich(db, p)).collect()
}

pub fn count_products(db: &Database, filter: ProductFilter) -> StoreResult<i64> {
    let conn = db.get()?;
    let count = conn.query_row(
        "SELECT COUNT(*) FROM products WHERE (?1 = 0 OR published = 1) AND (?2 = 0 OR featured = 1)",
        (filter.published_only, filter.featured_only),
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Returns whether a product was removed.
pub fn delete_product(db: &Database, id: i64) -> StoreResult<bool> {
    let conn = db.get()?;
    let removed = conn.execute("DELETE FROM products WHERE id = ?", [id])?;
    if removed > 0 {
        tracing::info!(product_id = id, "Deleted product");
    }
    Ok(removed > 0)
}

pub struct ProductReferences;

impl ReferenceSource for ProductReferences {
    fn kind(&self) -> ReferenceKind {
        ReferenceKind::Product
    }

    fn count_references(&self, conn: &Connection, media_id: i64) -> StoreResult<u64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(DISTINCT product_id) FROM product_media WHERE media_id = ?",
            [media_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sizes_mixed() {
        let raw = vec!["10x20, 12x24".to_string(), " ".to_string(), "16x32".to_string()];
        assert_eq!(parse_sizes(&raw), vec!["10x20", "12x24", "16x32"]);
    }

    #[test]
    fn test_normalize_rejects_negative_price() {
        let input = ProductInput {
            name: "Filter".into(),
            price: Some(-1.0),
            ..Default::default()
        };
        assert!(matches!(normalize(input), Err(ContentError::Invalid(_))));
    }

    #[test]
    fn test_normalize_requires_name() {
        let input = ProductInput {
            name: "  ".into(),
            ..Default::default()
        };
        assert!(matches!(normalize(input), Err(ContentError::Required("name"))));
    }
}
