use crate::db::{Database, StoreResult};
use crate::models::{Hero, SettingsInput, SiteSettings, Socials, Theme, DEFAULT_COMPANY_NAME};
use crate::services::content::{ensure_media_exist, is_plausible_email, ContentError, ContentResult};
use crate::services::references::{ReferenceGate, ReferenceKind, ReferenceSource};
use rusqlite::{Connection, OptionalExtension, Row};

const SETTINGS_COLUMNS: &str = "company_name, phone, email, address, business_hours, \
     social_facebook, social_instagram, social_google, social_twitter, social_linkedin, \
     logo_media_id, hero_use_image, hero_headline, hero_subheadline, hero_cta_text, hero_cta_link, \
     hero_media_id, theme_mode, theme_preset_name, theme_custom, updated_at";

fn row_to_settings(row: &Row) -> rusqlite::Result<SiteSettings> {
    let mode: String = row.get(17)?;
    let custom: String = row.get(19)?;
    Ok(SiteSettings {
        company_name: row.get(0)?,
        phone: row.get(1)?,
        email: row.get(2)?,
        address: row.get(3)?,
        business_hours: row.get(4)?,
        socials: Socials {
            facebook: row.get(5)?,
            instagram: row.get(6)?,
            google: row.get(7)?,
            twitter: row.get(8)?,
            linkedin: row.get(9)?,
        },
        logo_media_id: row.get(10)?,
        hero: Hero {
            use_image: row.get(11)?,
            headline: row.get(12)?,
            subheadline: row.get(13)?,
            cta_text: row.get(14)?,
            cta_link: row.get(15)?,
            hero_media_id: row.get(16)?,
        },
        theme: Theme {
            mode: mode.parse().unwrap_or_default(),
            preset_name: row.get(18)?,
            custom: serde_json::from_str(&custom).unwrap_or_default(),
        },
        updated_at: row.get(20)?,
    })
}

fn load(conn: &Connection) -> rusqlite::Result<Option<SiteSettings>> {
    conn.query_row(
        &format!("SELECT {} FROM settings WHERE id = 1", SETTINGS_COLUMNS),
        [],
        row_to_settings,
    )
    .optional()
}

/// The settings record, created with defaults on first access.
pub fn get_settings(db: &Database) -> StoreResult<SiteSettings> {
    let conn = db.get()?;
    if let Some(settings) = load(&conn)? {
        return Ok(settings);
    }
    conn.execute("INSERT OR IGNORE INTO settings (id) VALUES (1)", [])?;
    let settings = load(&conn)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?;
    Ok(settings)
}

/// Writes the starter record used by a fresh install. Returns `false` if one already exists.
pub fn seed_defaults(db: &Database) -> StoreResult<bool> {
    let conn = db.get()?;
    let inserted = conn.execute(
        r#"
        INSERT OR IGNORE INTO settings (id, company_name, hero_headline, hero_subheadline,
            hero_cta_text, hero_cta_link)
        VALUES (1, ?, ?, ?, ?, ?)
        "#,
        (
            DEFAULT_COMPANY_NAME,
            format!("Welcome to {}", DEFAULT_COMPANY_NAME),
            "Your trusted partner for premium pool and spa solutions",
            "Get Started",
            "/contact",
        ),
    )?;
    Ok(inserted > 0)
}

fn validate_theme(theme: &Theme) -> ContentResult<()> {
    if !Theme::is_valid_preset(&theme.preset_name) {
        return Err(ContentError::Invalid(format!(
            "Invalid theme preset '{}'. Available presets: {}",
            theme.preset_name,
            Theme::PRESETS.join(", ")
        )));
    }
    Ok(())
}

/// Replace the settings record from a form submission.
///
/// The logo is only replaced when a new id is supplied; the hero image follows
/// the submission as-is, so omitting it clears it.
pub fn update_settings(
    db: &Database,
    gate: &ReferenceGate,
    input: SettingsInput,
) -> ContentResult<SiteSettings> {
    let email = input.email.trim().to_lowercase();
    if !email.is_empty() && !is_plausible_email(&email) {
        return Err(ContentError::Invalid("Valid email required".to_string()));
    }
    let theme = input.theme.unwrap_or_default();
    validate_theme(&theme)?;

    let _attach = gate.attach();
    let current = get_settings(db)?;

    let referenced: Vec<i64> = input
        .logo_media_id
        .into_iter()
        .chain(input.hero.hero_media_id)
        .collect();
    ensure_media_exist(db, &referenced)?;

    let company_name = input
        .company_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or(current.company_name);
    let logo_media_id = input.logo_media_id.or(current.logo_media_id);
    let custom =
        serde_json::to_string(&theme.custom).map_err(|e| ContentError::Invalid(e.to_string()))?;

    let conn = db.get()?;
    conn.execute(
        r#"
        UPDATE settings SET company_name = ?, phone = ?, email = ?, address = ?, business_hours = ?,
            social_facebook = ?, social_instagram = ?, social_google = ?, social_twitter = ?,
            social_linkedin = ?, logo_media_id = ?, hero_use_image = ?, hero_headline = ?,
            hero_subheadline = ?, hero_cta_text = ?, hero_cta_link = ?, hero_media_id = ?,
            theme_mode = ?, theme_preset_name = ?, theme_custom = ?,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = 1
        "#,
        rusqlite::params![
            company_name,
            input.phone.trim(),
            email,
            input.address.trim(),
            input.business_hours.trim(),
            input.socials.facebook.trim(),
            input.socials.instagram.trim(),
            input.socials.google.trim(),
            input.socials.twitter.trim(),
            input.socials.linkedin.trim(),
            logo_media_id,
            input.hero.use_image,
            input.hero.headline.trim(),
            input.hero.subheadline.trim(),
            input.hero.cta_text.trim(),
            input.hero.cta_link.trim(),
            input.hero.hero_media_id,
            theme.mode.to_string(),
            theme.preset_name,
            custom,
        ],
    )?;

    let settings = load(&conn)?.ok_or(ContentError::NotFound)?;
    tracing::info!("Settings updated");
    Ok(settings)
}

/// The settings singleton references media through its logo and hero image.
pub struct SettingsReferences;

impl ReferenceSource for SettingsReferences {
    fn kind(&self) -> ReferenceKind {
        ReferenceKind::Settings
    }

    fn count_references(&self, conn: &Connection, media_id: i64) -> StoreResult<u64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM settings WHERE logo_media_id = ?1 OR hero_media_id = ?1",
            [media_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
