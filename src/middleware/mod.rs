//! HTTP middleware components.
//!
//! Middleware are functions that run before route handlers.
//! They can:
//! - Authenticate requests (session cookie or API key)
//! - Throttle clients
//! - Short-circuit requests (reject unauthorized)

/// Bearer API key authentication for the public surface
pub mod api_key;
/// Per-client token bucket rate limiting
pub mod rate_limit;
/// Cookie session authentication for the web surface
pub mod session;
