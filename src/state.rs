//! Shared application state handed to every handler.

use crate::{config::Config, db::DbPool};

/// State injected into handlers and middleware via Axum's `State` extractor.
///
/// Cloning is cheap: the pool and HTTP client are internally reference
/// counted, and the config is small.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: DbPool,

    /// Loaded environment configuration
    pub config: Config,

    /// Shared outbound HTTP client (Google OAuth, Stripe)
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(pool: DbPool, config: Config) -> Self {
        Self {
            pool,
            config,
            http: reqwest::Client::new(),
        }
    }
}
