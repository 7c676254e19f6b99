use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const DEFAULT_COMPANY_NAME: &str = "Aquarian Pool and Spa";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Preset,
    Custom,
}

impl FromStr for ThemeMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "preset" => Ok(Self::Preset),
            "custom" => Ok(Self::Custom),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Preset => write!(f, "preset"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeColors {
    pub primary: String,
    pub secondary: String,
    pub background: String,
    pub text: String,
    pub accent: String,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            primary: "#0d6efd".to_string(),
            secondary: "#6c757d".to_string(),
            background: "#ffffff".to_string(),
            text: "#212529".to_string(),
            accent: "#0d6efd".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default)]
    pub mode: ThemeMode,
    #[serde(default = "default_preset")]
    pub preset_name: String,
    #[serde(default)]
    pub custom: ThemeColors,
}

impl Theme {
    pub const PRESETS: [&'static str; 5] = [
        "ocean-blue",
        "deep-teal",
        "crystal-clear",
        "midnight-blue",
        "tropical-turquoise",
    ];

    pub fn is_valid_preset(name: &str) -> bool {
        Self::PRESETS.contains(&name)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            mode: ThemeMode::Preset,
            preset_name: default_preset(),
            custom: ThemeColors::default(),
        }
    }
}

fn default_preset() -> String {
    "ocean-blue".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Socials {
    #[serde(default)]
    pub facebook: String,
    #[serde(default)]
    pub instagram: String,
    #[serde(default)]
    pub google: String,
    #[serde(default)]
    pub twitter: String,
    #[serde(default)]
    pub linkedin: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hero {
    #[serde(default)]
    pub use_image: bool,
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub subheadline: String,
    #[serde(default)]
    pub cta_text: String,
    #[serde(default)]
    pub cta_link: String,
    #[serde(default)]
    pub hero_media_id: Option<i64>,
}

/// The single site-wide settings record.
#[derive(Debug, Clone, Serialize)]
pub struct SiteSettings {
    pub company_name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub business_hours: String,
    pub socials: Socials,
    pub logo_media_id: Option<i64>,
    pub hero: Hero,
    pub theme: Theme,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsInput {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub business_hours: String,
    #[serde(default)]
    pub socials: Socials,
    /// Left untouched when `None`.
    #[serde(default)]
    pub logo_media_id: Option<i64>,
    #[serde(default)]
    pub hero: Hero,
    #[serde(default)]
    pub theme: Option<Theme>,
}
