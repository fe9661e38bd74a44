//! Data models representing database entities.
//!
//! This module contains all data structures that map to database tables,
//! together with their API request/response types.

/// API key model and metadata responses
pub mod api_key;
/// JSON document model, metadata responses, and derived routes
pub mod json_file;
/// Browser session model
pub mod session;
/// Authenticated user model
pub mod user;
