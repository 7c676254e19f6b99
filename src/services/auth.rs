use anyhow::Result;
use sha2::{Digest, Sha256};

pub const MIN_TOKEN_LENGTH: usize = 16;

/// SHA-256 hex digest of a raw admin token, as stored in `auth.admin_token_hash`.
pub fn hash_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

pub fn validate_token(raw: &str) -> Result<()> {
    if raw.len() < MIN_TOKEN_LENGTH {
        anyhow::bail!("Token must be at least {} characters", MIN_TOKEN_LENGTH);
    }
    if raw.chars().any(char::is_whitespace) {
        anyhow::bail!("Token must not contain whitespace");
    }
    Ok(())
}

/// A missing configured hash rejects every token.
pub fn verify_token(raw: &str, expected_hash: Option<&str>) -> bool {
    let Some(expected) = expected_hash else {
        return false;
    };
    let actual = hash_token(raw);
    let expected = expected.to_ascii_lowercase();
    if actual.len() != expected.len() {
        return false;
    }
    actual
        .bytes()
        .zip(expected.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_token_is_hex_sha256() {
        let hash = hash_token("correct-horse-battery");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, hash_token("correct-horse-battery"));
    }

    #[test]
    fn test_verify_token() {
        let hash = hash_token("correct-horse-battery");
        assert!(verify_token("correct-horse-battery", Some(&hash)));
        assert!(verify_token("correct-horse-battery", Some(&hash.to_uppercase())));
        assert!(!verify_token("wrong-horse-battery", Some(&hash)));
        assert!(!verify_token("correct-horse-battery", None));
    }

    #[test]
    fn test_validate_token() {
        assert!(validate_token("short").is_err());
        assert!(validate_token("has a space in the middle").is_err());
        assert!(validate_token("a-long-enough-admin-token").is_ok());
    }
}
