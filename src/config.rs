//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `CLIENT_URL` (required): browser app origin, used for CORS and redirects
/// - `BASE_URL` (required): public origin of this API, used as the OAuth
///   redirect base
/// - `GOOGLE_CLIENT_ID` / `GOOGLE_CLIENT_SECRET` (required): OAuth credentials
/// - `STRIPE_SECRET_KEY` / `STRIPE_WEBHOOK_SECRET` (required): billing
///   credentials
/// - `FREE_FILE_LIMIT` (optional): max JSON files on the free tier, defaults to 3
/// - `PRO_FILE_LIMIT` (optional): max JSON files for subscribers, defaults to 100
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    pub client_url: String,

    pub base_url: String,

    pub google_client_id: String,

    pub google_client_secret: String,

    pub stripe_secret_key: String,

    pub stripe_webhook_secret: String,

    #[serde(default = "default_free_file_limit")]
    pub free_file_limit: usize,

    #[serde(default = "default_pro_file_limit")]
    pub pro_file_limit: usize,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

fn default_free_file_limit() -> usize {
    3
}

fn default_pro_file_limit() -> usize {
    100
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., DATABASE_URL)
    /// - Environment variable values cannot be parsed into expected types
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        // Parse environment variables into Config struct
        // Field names are automatically converted: database_url -> DATABASE_URL
        envy::from_env::<Config>()
    }

    /// File quota for a user, depending on their subscription tier.
    pub fn file_limit(&self, subscribed: bool) -> usize {
        if subscribed {
            self.pro_file_limit
        } else {
            self.free_file_limit
        }
    }
}
