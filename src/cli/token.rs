use crate::services::auth;
use anyhow::Result;

pub async fn run(raw: &str) -> Result<()> {
    auth::validate_token(raw)?;

    println!("Add this to the [auth] section of your config:\n");
    println!("admin_token_hash = \"{}\"", auth::hash_token(raw));
    println!("\nThen send requests with `Authorization: Bearer <token>`.");

    Ok(())
}
