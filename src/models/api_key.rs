//! API Key model for the public surface.
//!
//! API keys authenticate third-party callers of the `/public` routes. They are
//! stored in the database as SHA-256 hashes for security; the plaintext secret
//! is returned exactly once at creation and cannot be recovered afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents an API key record from the database.
///
/// # Database Table
///
/// Maps to the `api_keys` table. The hash itself is the primary key: it is
/// what the client addresses when revoking a key, and what the auth
/// middleware looks up after hashing a presented bearer token.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ApiKey {
    /// SHA-256 hash of the actual API key (64 hex characters)
    ///
    /// When a request comes in with "Bearer abc123", we:
    /// 1. Hash "abc123" with SHA-256
    /// 2. Look up this hash in the database
    /// 3. If found, authenticate the request as the key's owner
    pub key_hash: String,

    /// User that owns this key
    pub user_id: Uuid,

    /// Human-readable label chosen at creation
    pub name: String,

    /// Timestamp when this API key was created
    pub created_at: DateTime<Utc>,

    /// Timestamp of the most recent authenticated request
    pub last_used_at: DateTime<Utc>,
}

/// Request body for creating a new API key.
///
/// ```json
/// { "name": "production backend" }
/// ```
#[derive(Debug, Deserialize)]
pub struct CreateApiKeyRequest {
    pub name: String,
}

/// Response body for API key creation.
///
/// This is the only place the plaintext secret ever appears.
///
/// ```json
/// { "apiKey": "3f79…64 hex chars…ce" }
/// ```
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyCreatedResponse {
    pub api_key: String,
}

/// Metadata returned by the key listing; never contains the secret.
///
/// ```json
/// {
///   "hash": "9c52…",
///   "name": "production backend",
///   "createdAt": "2025-06-01T10:00:00Z",
///   "lastUsedAt": "2025-06-02T08:15:00Z"
/// }
/// ```
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyMetadataResponse {
    pub hash: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
}

impl From<ApiKey> for ApiKeyMetadataResponse {
    fn from(key: ApiKey) -> Self {
        Self {
            hash: key.key_hash,
            name: key.name,
            created_at: key.created_at,
            last_used_at: key.last_used_at,
        }
    }
}
