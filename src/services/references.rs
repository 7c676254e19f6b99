use crate::db::StoreResult;
use crate::services::{portfolio, products, settings};
use rusqlite::Connection;
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Product,
    PortfolioPost,
    Settings,
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Product => write!(f, "products"),
            Self::PortfolioPost => write!(f, "portfolio"),
            Self::Settings => write!(f, "settings"),
        }
    }
}

/// An entity type that can point at media assets.
pub trait ReferenceSource: Send + Sync {
    fn kind(&self) -> ReferenceKind;

    /// Number of entities of this kind referencing `media_id`, read on `conn`.
    fn count_references(&self, conn: &Connection, media_id: i64) -> StoreResult<u64>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReferenceCount {
    pub kind: ReferenceKind,
    pub count: u64,
}

/// Live references found for one media asset, by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReferenceReport {
    pub references: Vec<ReferenceCount>,
}

impl ReferenceReport {
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn total(&self) -> u64 {
        self.references.iter().map(|r| r.count).sum()
    }
}

impl std::fmt::Display for ReferenceReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .references
            .iter()
            .filter(|r| r.count > 0)
            .map(|r| format!("{} ({})", r.kind, r.count))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// Scans every registered reference source before a media asset is destroyed.
pub struct ReferenceAuditor {
    sources: Vec<Box<dyn ReferenceSource>>,
}

impl ReferenceAuditor {
    pub fn new(sources: Vec<Box<dyn ReferenceSource>>) -> Self {
        Self { sources }
    }

    /// Auditor covering every table that can hold a media id.
    pub fn sqlite() -> Self {
        Self::new(vec![
            Box::new(products::ProductReferences),
            Box::new(portfolio::PortfolioReferences),
            Box::new(settings::SettingsReferences),
        ])
    }

    /// All sources read on `conn`, which may be inside an open transaction.
    pub fn audit(&self, conn: &Connection, media_id: i64) -> StoreResult<ReferenceReport> {
        let mut report = ReferenceReport::default();
        for source in &self.sources {
            let count = source.count_references(conn, media_id)?;
            if count > 0 {
                report.references.push(ReferenceCount {
                    kind: source.kind(),
                    count,
                });
            }
        }
        Ok(report)
    }

    pub fn can_delete(&self, conn: &Connection, media_id: i64) -> StoreResult<bool> {
        Ok(self.audit(conn, media_id)?.is_empty())
    }
}

/// Serializes media deletion against writes that attach media to content
/// within one process.
///
/// Deletion holds the exclusive side while its removal transaction is open;
/// every write of a media reference holds the shared side. Writers in other
/// processes are held off by the removal's `BEGIN IMMEDIATE` instead.
#[derive(Clone, Default)]
pub struct ReferenceGate {
    lock: Arc<RwLock<()>>,
}

impl ReferenceGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self) -> RwLockReadGuard<'_, ()> {
        self.lock.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn exclusive(&self) -> RwLockWriteGuard<'_, ()> {
        self.lock.write().unwrap_or_else(PoisonError::into_inner)
    }
}
