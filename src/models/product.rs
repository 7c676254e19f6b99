use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Seo {
    #[serde(default)]
    pub meta_title: String,
    #[serde(default)]
    pub meta_description: String,
    #[serde(default)]
    pub meta_keywords: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub short_description: String,
    pub description: String,
    pub price: Option<f64>,
    pub featured: bool,
    pub published: bool,
    pub media_ids: Vec<i64>,
    pub sizes: Vec<String>,
    pub seo: Seo,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub media_ids: Vec<i64>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub seo: Seo,
}
