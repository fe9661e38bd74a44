//! User data model and API response types.
//!
//! Users are created on first OAuth login and own every other entity in the
//! system: JSON files, API keys, sessions, and the Stripe customer record.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Represents a user record from the database.
///
/// # Database Table
///
/// Maps to the `users` table. `provider_id` is the stable subject identifier
/// from the OAuth provider; logging in again with the same Google account
/// updates the profile instead of creating a duplicate.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique identifier for this user
    pub id: Uuid,

    /// OAuth provider subject id (`sub` claim from Google)
    pub provider_id: String,

    /// Email address reported by the provider
    pub email: String,

    /// Display name reported by the provider
    pub name: String,

    /// Stripe customer id, empty string until first checkout
    pub stripe_customer_id: String,

    /// Whether the user currently has an active subscription
    ///
    /// The source of truth is Stripe; this flag is kept in sync by the
    /// webhook handler and the post-checkout sync endpoint.
    pub subscribed: bool,

    /// Timestamp when the user first logged in
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last profile update
    pub updated_at: DateTime<Utc>,
}

/// Response body for `GET /me`.
///
/// ```json
/// {
///   "id": "550e8400-e29b-41d4-a716-446655440000",
///   "email": "ada@example.com",
///   "name": "Ada Lovelace"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

/// Convert database User to API UserResponse.
///
/// Drops the provider id, billing fields, and timestamps.
impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
        }
    }
}
