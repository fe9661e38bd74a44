//! Session issuance and validation for the cookie-authenticated web surface.
//!
//! # Token Handling
//!
//! A session token is 32 bytes of randomness, hex encoded, handed to the
//! browser in the `session_token` cookie. The database only ever sees the
//! SHA-256 hex digest of that token, stored as the session id: leaking the
//! sessions table does not leak usable credentials.
//!
//! # Lifetime
//!
//! Sessions live for 30 days. Validation slides the expiry: whenever a valid
//! session has less than 15 days left, it is extended back to 30 days.
//! Expired sessions are deleted on sight.

use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    models::{session::Session, user::User},
};

/// Total session lifetime.
const SESSION_LIFETIME_DAYS: i64 = 30;

/// Remaining lifetime below which validation extends the session.
const SESSION_RENEW_THRESHOLD_DAYS: i64 = 15;

/// Generate a new session token (64 hex characters, 32 random bytes).
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

/// SHA-256 hex digest of a token; this is the session's database id.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Create a session for a user and return it alongside the plaintext token.
///
/// The token goes into the cookie; only its hash is persisted.
pub async fn create_session(pool: &DbPool, user_id: Uuid) -> Result<(String, Session), AppError> {
    let token = generate_token();
    let expires_at = Utc::now() + Duration::days(SESSION_LIFETIME_DAYS);

    let session = sqlx::query_as::<_, Session>(
        r#"
        INSERT INTO sessions (id, user_id, expires_at)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, expires_at, created_at
        "#,
    )
    .bind(hash_token(&token))
    .bind(user_id)
    .bind(expires_at)
    .fetch_one(pool)
    .await?;

    Ok((token, session))
}

/// Validate a session token and return the user it belongs to.
///
/// # Flow
///
/// 1. Hash the token and look up the session
/// 2. Delete and reject if expired
/// 3. Extend the expiry when less than half the lifetime remains
/// 4. Load the owning user
///
/// Every failure collapses to `InvalidSession` (401): the web client treats
/// any of them as "not logged in".
pub async fn validate_session(pool: &DbPool, token: &str) -> Result<User, AppError> {
    let session_id = hash_token(token);

    let session = sqlx::query_as::<_, Session>(
        "SELECT id, user_id, expires_at, created_at FROM sessions WHERE id = $1",
    )
    .bind(&session_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::InvalidSession)?;

    let now = Utc::now();
    if session.expires_at < now {
        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(&session_id)
            .execute(pool)
            .await?;
        return Err(AppError::InvalidSession);
    }

    if session.expires_at < now + Duration::days(SESSION_RENEW_THRESHOLD_DAYS) {
        sqlx::query("UPDATE sessions SET expires_at = $2 WHERE id = $1")
            .bind(&session_id)
            .bind(now + Duration::days(SESSION_LIFETIME_DAYS))
            .execute(pool)
            .await?;
    }

    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, provider_id, email, name, stripe_customer_id, subscribed, created_at, updated_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(session.user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::InvalidSession)?;

    Ok(user)
}

/// Invalidate a session by its plaintext token. Deleting a session that no
/// longer exists is not an error: logout is idempotent.
pub async fn invalidate_session(pool: &DbPool, token: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM sessions WHERE id = $1")
        .bind(hash_token(token))
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_64_hex_chars() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn tokens_are_unique() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn hash_is_deterministic_and_distinct_from_token() {
        let token = generate_token();
        let hash = hash_token(&token);
        assert_eq!(hash, hash_token(&token));
        assert_ne!(hash, token);
        assert_eq!(hash.len(), 64);
    }

    #[test]
    fn hash_matches_known_sha256_vector() {
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
