//! Browser session model.
//!
//! Sessions back the cookie-authenticated web surface. The session token is a
//! 256-bit random value that only ever lives in the `session_token` cookie;
//! the database stores its SHA-256 hex digest as the session id.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Represents a session record from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    /// SHA-256 hex digest of the session token (64 hex characters)
    pub id: String,

    /// User this session belongs to
    pub user_id: Uuid,

    /// Absolute expiry; extended on use when less than half the lifetime
    /// remains
    pub expires_at: DateTime<Utc>,

    /// Timestamp when this session was created
    pub created_at: DateTime<Utc>,
}
