//! JSON File Service - Main Application Entry Point
//!
//! This is a REST API server that turns user-authored JSON documents into
//! live APIs. Users sign in with Google, edit named JSON files, and each
//! file's top-level keys become REST sub-routes served under `/public`,
//! gated by API keys and a subscription-aware file limit.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries); documents live in a
//!   key-order-preserving JSON column
//! - **Authentication**: Google OAuth + cookie sessions (web surface),
//!   SHA-256-hashed API keys (public surface)
//! - **Billing**: Stripe checkout, portal and webhooks over reqwest
//! - **Format**: JSON requests/responses
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool
//! 3. Run database migrations
//! 4. Build HTTP routers (web, public, unauthenticated) with middleware
//! 5. Start server on configured port

mod config;
mod cookies;
mod db;
mod error;
mod extract;
mod handlers;
mod middleware;
mod models;
mod services;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use middleware::rate_limit::RateLimiter;

/// Token bucket capacity for the session-authenticated web surface.
const WEB_RATE_CAPACITY: u32 = 10;
/// Token bucket capacity for the API-key public surface.
const PUBLIC_RATE_CAPACITY: u32 = 5;
/// Tokens restored per second, both surfaces.
const RATE_REFILL_PER_SEC: f64 = 1.0;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration
    let config = config::Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Create database pool
    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    // Run migrations
    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    let server_port = config.server_port;
    let client_origin = config.client_url.parse::<HeaderValue>()?;
    let state = state::AppState::new(pool, config);

    // Separate limiters so heavy public traffic cannot starve the dashboard
    let web_limiter = Arc::new(RateLimiter::new(WEB_RATE_CAPACITY, RATE_REFILL_PER_SEC));
    let public_limiter = Arc::new(RateLimiter::new(PUBLIC_RATE_CAPACITY, RATE_REFILL_PER_SEC));

    // The browser dashboard sends the session cookie cross-origin, so this
    // surface names the client origin explicitly and allows credentials.
    let web_cors = CorsLayer::new()
        .allow_origin(client_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    // Public routes authenticate with a bearer key, never cookies, so any
    // origin may call them.
    let public_cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    // Session-authenticated web surface (dashboard API)
    let web_routes = Router::new()
        // Current user and session
        .route("/me", get(handlers::auth::me))
        .route("/logout", put(handlers::auth::logout))
        .route("/users", delete(handlers::auth::delete_account))
        // API key management
        .route("/apikeys", post(handlers::api_keys::create_api_key))
        .route("/apikeys", get(handlers::api_keys::list_api_keys))
        .route(
            "/apikeys/{keyHash}",
            delete(handlers::api_keys::delete_api_key),
        )
        // JSON document management
        .route("/jsonfiles", post(handlers::json_files::create_file))
        .route("/jsonfiles", get(handlers::json_files::list_files))
        .route(
            "/jsonfiles/{fileId}",
            get(handlers::json_files::get_file)
                .put(handlers::json_files::update_file)
                .patch(handlers::json_files::rename_file)
                .delete(handlers::json_files::delete_file),
        )
        .route(
            "/jsonfiles/{fileId}/metadata",
            get(handlers::json_files::get_file_metadata),
        )
        .route(
            "/jsonfiles/{fileId}/routes",
            get(handlers::json_files::get_routes),
        )
        // Billing
        .route(
            "/subscriptions/checkout",
            post(handlers::subscriptions::checkout),
        )
        .route("/subscriptions", get(handlers::subscriptions::status))
        .route(
            "/subscriptions/success",
            post(handlers::subscriptions::checkout_success),
        )
        .route(
            "/subscriptions/manage",
            get(handlers::subscriptions::manage),
        )
        // Later layers run first: rate limiting sheds load before the
        // session lookup hits the database.
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::session::session_middleware,
        ))
        .route_layer(axum_middleware::from_fn_with_state(
            web_limiter,
            middleware::rate_limit::rate_limit_middleware,
        ))
        .layer(web_cors.clone());

    // API-key-authenticated public surface: the derived routes
    let public_routes = Router::new()
        .route("/public/{fileId}", get(handlers::public::get_file))
        .route(
            "/public/{fileId}/{resource}",
            get(handlers::public::get_resource)
                .put(handlers::public::update_resource)
                .patch(handlers::public::patch_resource)
                .post(handlers::public::create_resource_item),
        )
        .route(
            "/public/{fileId}/{resource}/{id}",
            get(handlers::public::get_resource_item)
                .put(handlers::public::update_resource_item)
                .patch(handlers::public::patch_resource_item)
                .delete(handlers::public::delete_resource_item),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::api_key::api_key_middleware,
        ))
        .route_layer(axum_middleware::from_fn_with_state(
            public_limiter,
            middleware::rate_limit::rate_limit_middleware,
        ))
        .layer(public_cors);

    // Combine with unauthenticated routes
    let app = Router::new()
        // Public routes (no authentication required)
        .route("/health", get(handlers::health::health_check))
        .route("/auth/google/login", get(handlers::auth::google_login))
        .route(
            "/auth/google/callback",
            get(handlers::auth::google_callback),
        )
        .route(
            "/webhooks/stripe",
            post(handlers::subscriptions::stripe_webhook),
        )
        .layer(web_cors)
        // Merge authenticated surfaces
        .merge(web_routes)
        .merge(public_routes)
        // Add distributed tracing middleware for observability
        .layer(TraceLayer::new_for_http())
        // Share state with all handlers via State extraction
        .with_state(state);

    // Bind to network address and start server
    let addr = format!("0.0.0.0:{server_port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // ConnectInfo gives the rate limiter the client address of each request
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
