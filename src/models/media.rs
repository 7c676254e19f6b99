use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The three derived renditions every media asset carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantSize {
    Large,
    Medium,
    Thumb,
}

impl VariantSize {
    pub const ALL: [VariantSize; 3] = [Self::Large, Self::Medium, Self::Thumb];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Large => "large",
            Self::Medium => "medium",
            Self::Thumb => "thumb",
        }
    }
}

impl FromStr for VariantSize {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "large" => Ok(Self::Large),
            "medium" => Ok(Self::Medium),
            "thumb" => Ok(Self::Thumb),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for VariantSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub storage_id: i64,
    pub width: u32,
    pub height: u32,
    pub bytes: u64,
}

/// Exactly one variant per size; there is no way to build a partial set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSet {
    pub large: Variant,
    pub medium: Variant,
    pub thumb: Variant,
}

impl VariantSet {
    pub fn get(&self, size: VariantSize) -> &Variant {
        match size {
            VariantSize::Large => &self.large,
            VariantSize::Medium => &self.medium,
            VariantSize::Thumb => &self.thumb,
        }
    }

    pub fn storage_ids(&self) -> [i64; 3] {
        [
            self.large.storage_id,
            self.medium.storage_id,
            self.thumb.storage_id,
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MediaAsset {
    pub id: i64,
    pub filename: String,
    pub original_name: String,
    pub mime_type: String,
    pub title: String,
    pub alt_text: String,
    pub sizes: VariantSet,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewMediaAsset {
    pub filename: String,
    pub original_name: String,
    pub mime_type: String,
    pub sizes: VariantSet,
}

/// Stored binary payload backing one variant.
#[derive(Debug, Clone)]
pub struct Blob {
    pub id: i64,
    pub data: Vec<u8>,
    pub content_type: String,
    pub created_at: String,
}
