//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers.
//! They handle database access, cryptography, outbound API calls, and the
//! pure JSON semantics behind the public surface.

pub mod api_key_service;
pub mod billing_service;
pub mod file_service;
pub mod oauth_service;
pub mod resource_service;
pub mod route_service;
pub mod session_service;
