use crate::db::{Database, StoreError, StoreResult};
use slug::slugify;

pub const MAX_SLUG_LEN: usize = 200;

/// Room left for a `-N` suffix when the base is clipped.
const MAX_BASE_LEN: usize = MAX_SLUG_LEN - 12;

#[derive(Debug, thiserror::Error)]
pub enum SlugError {
    #[error("'{0}' does not contain any characters usable in a URL")]
    Empty(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub fn generate_slug(title: &str) -> String {
    let slug = slugify(title);
    if slug.len() <= MAX_BASE_LEN {
        return slug;
    }
    slug[..MAX_BASE_LEN].trim_end_matches('-').to_string()
}

pub fn validate_slug(slug: &str) -> bool {
    if slug.is_empty() || slug.len() > MAX_SLUG_LEN {
        return false;
    }
    slug.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Derive the first free slug for `title`: the base itself, then `base-1`, `base-2`, ...
///
/// `is_taken` is the only view of existing slugs, so this stays independent of storage.
pub fn compute_slug<F>(title: &str, mut is_taken: F) -> Result<String, SlugError>
where
    F: FnMut(&str) -> StoreResult<bool>,
{
    let base = generate_slug(title);
    if base.is_empty() {
        return Err(SlugError::Empty(title.to_string()));
    }

    let mut candidate = base.clone();
    let mut counter: u64 = 1;
    while is_taken(&candidate)? {
        candidate = format!("{}-{}", base, counter);
        counter += 1;
    }
    Ok(candidate)
}

/// Collections whose rows carry a unique slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugScope {
    Product,
    PortfolioPost,
}

impl SlugScope {
    pub fn table(&self) -> &'static str {
        match self {
            Self::Product => "products",
            Self::PortfolioPost => "portfolio_posts",
        }
    }
}

/// Existence check consulted while assigning slugs.
pub trait SlugIndex {
    fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> StoreResult<bool>;
}

pub struct TableSlugIndex<'a> {
    db: &'a Database,
    scope: SlugScope,
}

impl<'a> TableSlugIndex<'a> {
    pub fn new(db: &'a Database, scope: SlugScope) -> Self {
        Self { db, scope }
    }
}

impl SlugIndex for TableSlugIndex<'_> {
    fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> StoreResult<bool> {
        let conn = self.db.get()?;
        let exists: bool = conn.query_row(
            &format!(
                "SELECT EXISTS(SELECT 1 FROM {} WHERE slug = ?1 AND (?2 IS NULL OR id != ?2))",
                self.scope.table()
            ),
            rusqlite::params![slug, exclude_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }
}

pub fn assign_slug(
    index: &dyn SlugIndex,
    title: &str,
    exclude_id: Option<i64>,
) -> Result<String, SlugError> {
    compute_slug(title, |candidate| index.slug_exists(candidate, exclude_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// slug -> owning id
    struct MemoryIndex(RefCell<HashMap<String, i64>>);

    impl MemoryIndex {
        fn with(entries: &[(&str, i64)]) -> Self {
            Self(RefCell::new(
                entries.iter().map(|(s, id)| (s.to_string(), *id)).collect(),
            ))
        }
    }

    impl SlugIndex for MemoryIndex {
        fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> StoreResult<bool> {
            Ok(self
                .0
                .borrow()
                .get(slug)
                .is_some_and(|owner| Some(*owner) != exclude_id))
        }
    }

    #[test]
    fn test_compute_slug_without_collision() {
        let slug = compute_slug("Pool Cleaning", |_| Ok(false)).unwrap();
        assert_eq!(slug, "pool-cleaning");
    }

    #[test]
    fn test_compute_slug_appends_sequential_suffix() {
        let taken = ["pool-cleaning", "pool-cleaning-1", "pool-cleaning-2"];
        let slug = compute_slug("Pool Cleaning", |s| Ok(taken.contains(&s))).unwrap();
        assert_eq!(slug, "pool-cleaning-3");
    }

    #[test]
    fn test_compute_slug_rejects_unusable_title() {
        assert!(matches!(
            compute_slug("!!!", |_| Ok(false)),
            Err(SlugError::Empty(_))
        ));
    }

    #[test]
    fn test_assign_slug_ignores_own_row() {
        let index = MemoryIndex::with(&[("hot-tub", 4)]);
        assert_eq!(assign_slug(&index, "Hot Tub", Some(4)).unwrap(), "hot-tub");
        assert_eq!(assign_slug(&index, "Hot Tub", Some(5)).unwrap(), "hot-tub-1");
        assert_eq!(assign_slug(&index, "Hot Tub", None).unwrap(), "hot-tub-1");
    }

    #[test]
    fn test_generate_slug_clips_long_titles() {
        let slug = generate_slug(&"word ".repeat(100));
        assert!(slug.len() <= MAX_BASE_LEN);
        assert!(!slug.ends_with('-'));
        assert!(validate_slug(&format!("{}-99", slug)));
    }
}
