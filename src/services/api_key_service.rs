//! API key lifecycle: creation, listing, revocation, and authentication.
//!
//! The secret is generated once, shown once, and irrecoverable afterwards.
//! Only its SHA-256 hex digest is persisted, and that digest doubles as the
//! key's public identifier: listings expose it and revocation addresses it.

use chrono::Utc;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    models::api_key::{ApiKey, ApiKeyMetadataResponse},
};

/// Generate a new API key secret (64 hex characters, 32 random bytes).
pub fn generate_secret() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

/// SHA-256 hex digest of a secret; the stored and displayed key hash.
pub fn hash_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Validate a user-supplied key name, returning it with surrounding
/// whitespace trimmed. Empty and whitespace-only names are rejected with 400.
pub fn normalize_key_name(name: &str) -> Result<&str, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidRequest(
            "api key name cannot be empty".to_string(),
        ));
    }
    Ok(name)
}

/// Create a new API key and return the plaintext secret.
///
/// This is the only moment the secret exists server-side; the caller must
/// hand it to the user immediately.
pub async fn create_api_key(
    pool: &DbPool,
    user_id: Uuid,
    name: &str,
) -> Result<String, AppError> {
    let name = normalize_key_name(name)?;
    let secret = generate_secret();

    sqlx::query(
        r#"
        INSERT INTO api_keys (key_hash, user_id, name)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(hash_secret(&secret))
    .bind(user_id)
    .bind(name)
    .execute(pool)
    .await?;

    Ok(secret)
}

/// List a user's API keys, newest first. Secrets are never included: only
/// hashes, names, and timestamps survive creation.
pub async fn list_api_keys(
    pool: &DbPool,
    user_id: Uuid,
) -> Result<Vec<ApiKeyMetadataResponse>, AppError> {
    let keys = sqlx::query_as::<_, ApiKey>(
        r#"
        SELECT key_hash, user_id, name, created_at, last_used_at
        FROM api_keys
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(keys.into_iter().map(Into::into).collect())
}

/// Revoke an API key by its hash.
///
/// The delete filters by both hash and owner, so revoking someone else's key
/// reports 404 just like revoking a key that never existed.
pub async fn delete_api_key(pool: &DbPool, user_id: Uuid, key_hash: &str) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM api_keys WHERE key_hash = $1 AND user_id = $2")
        .bind(key_hash)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("api key not found".to_string()));
    }
    Ok(())
}

/// Authenticate a bearer secret from the public surface.
///
/// Hashes the presented secret, looks up the key, and touches
/// `last_used_at`. Unknown secrets yield 401.
pub async fn authenticate(pool: &DbPool, secret: &str) -> Result<ApiKey, AppError> {
    let key_hash = hash_secret(secret);

    let key = sqlx::query_as::<_, ApiKey>(
        r#"
        SELECT key_hash, user_id, name, created_at, last_used_at
        FROM api_keys
        WHERE key_hash = $1
        "#,
    )
    .bind(&key_hash)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::InvalidApiKey)?;

    sqlx::query("UPDATE api_keys SET last_used_at = $2 WHERE key_hash = $1")
        .bind(&key_hash)
        .bind(Utc::now())
        .execute(pool)
        .await?;

    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_is_64_hex_chars() {
        let secret = generate_secret();
        assert_eq!(secret.len(), 64);
        assert!(secret.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn secrets_are_unique() {
        assert_ne!(generate_secret(), generate_secret());
    }

    #[test]
    fn hash_never_equals_secret() {
        let secret = generate_secret();
        let hash = hash_secret(&secret);
        assert_ne!(hash, secret);
        assert_eq!(hash, hash_secret(&secret));
    }

    #[test]
    fn empty_key_name_is_rejected() {
        assert!(matches!(
            normalize_key_name(""),
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[test]
    fn whitespace_only_key_name_is_rejected() {
        assert!(matches!(
            normalize_key_name("  \t"),
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[test]
    fn padded_key_name_is_trimmed() {
        assert_eq!(
            normalize_key_name(" production backend ").unwrap(),
            "production backend"
        );
    }
}
