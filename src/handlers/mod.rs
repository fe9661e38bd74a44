//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, URL params, etc.)
//! 2. Performs business logic (database queries, validation)
//! 3. Returns HTTP response (JSON, status code)

/// API key management endpoints
pub mod api_keys;
/// Google OAuth login, session and account endpoints
pub mod auth;
/// Liveness endpoint
pub mod health;
/// JSON document management endpoints
pub mod json_files;
/// Bearer-key public endpoints serving document slices
pub mod public;
/// Stripe checkout, portal and webhook endpoints
pub mod subscriptions;
