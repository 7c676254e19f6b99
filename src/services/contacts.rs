use crate::db::{Database, StoreResult};
use crate::models::{ContactStatus, ContactSubmission, NewContact};
use crate::services::content::{is_plausible_email, required, ContentError, ContentResult};
use rusqlite::{OptionalExtension, Row};

const CONTACT_COLUMNS: &str =
    "id, name, email, phone, town, message, product_name, selected_size, status, created_at";

fn row_to_contact(row: &Row) -> rusqlite::Result<ContactSubmission> {
    let status: String = row.get(8)?;
    Ok(ContactSubmission {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        town: row.get(4)?,
        message: row.get(5)?,
        product_name: row.get(6)?,
        selected_size: row.get(7)?,
        status: status.parse().unwrap_or_default(),
        created_at: row.get(9)?,
    })
}

pub fn create_contact(db: &Database, input: NewContact) -> ContentResult<ContactSubmission> {
    let name = required(input.name, "name")?;
    let email = required(input.email, "email")?.to_lowercase();
    if !is_plausible_email(&email) {
        return Err(ContentError::Invalid("Valid email required".to_string()));
    }
    let town = required(input.town, "town")?;
    let message = required(input.message, "message")?;

    let conn = db.get()?;
    conn.execute(
        r#"
        INSERT INTO contact_submissions (name, email, phone, town, message, product_name, selected_size)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
        (
            &name,
            &email,
            input.phone.trim(),
            &town,
            &message,
            input.product_name.trim(),
            input.selected_size.trim(),
        ),
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(contact_id = id, "New contact submission");

    let contact = conn.query_row(
        &format!("SELECT {} FROM contact_submissions WHERE id = ?", CONTACT_COLUMNS),
        [id],
        row_to_contact,
    )?;
    Ok(contact)
}

pub fn list_contacts(
    db: &Database,
    status: Option<ContactStatus>,
    limit: usize,
    offset: usize,
) -> StoreResult<Vec<ContactSubmission>> {
    let conn = db.get()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM contact_submissions WHERE (?1 IS NULL OR status = ?1) \
         ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3",
        CONTACT_COLUMNS
    ))?;
    let contacts = stmt
        .query_map(
            rusqlite::params![status.map(|s| s.to_string()), limit as i64, offset as i64],
            row_to_contact,
        )?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(contacts)
}

pub fn count_contacts(db: &Database, status: Option<ContactStatus>) -> StoreResult<i64> {
    let conn = db.get()?;
    let count = conn.query_row(
        "SELECT COUNT(*) FROM contact_submissions WHERE (?1 IS NULL OR status = ?1)",
        [status.map(|s| s.to_string())],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn get_contact(db: &Database, id: i64) -> StoreResult<Option<ContactSubmission>> {
    let conn = db.get()?;
    let contact = conn
        .query_row(
            &format!("SELECT {} FROM contact_submissions WHERE id = ?", CONTACT_COLUMNS),
            [id],
            row_to_contact,
        )
        .optional()?;
    Ok(contact)
}

pub fn mark_contacted(db: &Database, id: i64) -> ContentResult<ContactSubmission> {
    {
        let conn = db.get()?;
        let updated = conn.execute(
            "UPDATE contact_submissions SET status = ? WHERE id = ?",
            (ContactStatus::Contacted.to_string(), id),
        )?;
        if updated == 0 {
            return Err(ContentError::NotFound);
        }
    }
    get_contact(db, id)?.ok_or(ContentError::NotFound)
}

pub fn delete_contact(db: &Database, id: i64) -> StoreResult<bool> {
    let conn = db.get()?;
    let removed = conn.execute("DELETE FROM contact_submissions WHERE id = ?", [id])?;
    Ok(removed > 0)
}

pub fn count_new_contacts(db: &Database) -> StoreResult<i64> {
    let conn = db.get()?;
    let count = conn.query_row(
        "SELECT COUNT(*) FROM contact_submissions WHERE status = 'new'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}
