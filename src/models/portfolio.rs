use super::Seo;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioPost {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub project_date: Option<String>,
    pub location: String,
    pub published: bool,
    pub media_ids: Vec<i64>,
    pub seo: Seo,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortfolioInput {
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub project_date: Option<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub media_ids: Vec<i64>,
    #[serde(default)]
    pub seo: Seo,
}
