//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// This enum represents all possible errors that can occur in the application.
/// Each variant maps to a specific HTTP status code and error message.
///
/// # Error Categories
///
/// - **Database Errors**: Any sqlx::Error from database operations
/// - **Authentication Errors**: Invalid sessions or API keys
/// - **Resource Errors**: Files, resources, or items that do not exist
/// - **Quota Errors**: Plan limits and rate limits
/// - **Validation Errors**: Invalid request data
/// - **Upstream Errors**: Google or Stripe calls that failed
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Session cookie is missing, unknown, or expired.
    ///
    /// Returns HTTP 401 Unauthorized. The web client treats this as
    /// "not logged in" and redirects to the login page.
    #[error("invalid session")]
    InvalidSession,

    /// API key is missing, malformed, or unknown.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("invalid api key")]
    InvalidApiKey,

    /// Requested entity does not exist or doesn't belong to the caller.
    ///
    /// Returns HTTP 404 Not Found. Ownership misses are reported as 404 so
    /// the existence of other users' files cannot be probed.
    #[error("{0}")]
    NotFound(String),

    /// The user has reached their plan's file quota.
    ///
    /// Returns HTTP 403 Forbidden.
    #[error("json file limit of {0} exceeded")]
    FileLimitExceeded(usize),

    /// Client exhausted its token bucket.
    ///
    /// Returns HTTP 429 Too Many Requests.
    #[error("rate limit exceeded")]
    RateLimited,

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    /// The String contains details about what was invalid.
    #[error("{0}")]
    InvalidRequest(String),

    /// Outbound call to Google or Stripe failed.
    ///
    /// Returns HTTP 502 Bad Gateway.
    #[error("upstream request failed")]
    Upstream(#[from] reqwest::Error),

    /// An upstream service answered with something we could not use.
    ///
    /// Returns HTTP 502 Bad Gateway. The String is logged, not exposed.
    #[error("upstream error: {0}")]
    UpstreamResponse(String),
}

/// Convert AppError into an HTTP response.
///
/// All errors share the flat envelope the clients parse on any non-2xx:
///
/// ```json
/// {
///   "error": "Human-readable error message"
/// }
/// ```
///
/// # Status Code Mapping
///
/// - `InvalidSession` / `InvalidApiKey` → 401 Unauthorized
/// - `NotFound` → 404 Not Found
/// - `FileLimitExceeded` → 403 Forbidden
/// - `RateLimited` → 429 Too Many Requests
/// - `InvalidRequest` → 400 Bad Request
/// - `Database` → 500 Internal Server Error (hides details from client)
/// - `Upstream` / `UpstreamResponse` → 502 Bad Gateway (hides details)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::InvalidSession => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::InvalidApiKey => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::NotFound(ref msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::FileLimitExceeded(_) => (StatusCode::FORBIDDEN, self.to_string()),
            AppError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, self.to_string()),
            AppError::InvalidRequest(ref msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Database(ref e) => {
                tracing::error!("database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "an internal error occurred".to_string(),
                )
            }
            AppError::Upstream(ref e) => {
                tracing::error!("upstream request failed: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "upstream request failed".to_string(),
                )
            }
            AppError::UpstreamResponse(ref msg) => {
                tracing::error!("upstream error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "upstream request failed".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": message }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_variants() {
        assert_eq!(
            AppError::InvalidSession.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::InvalidApiKey.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::NotFound("json file does not exist".into())
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::FileLimitExceeded(3).into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::RateLimited.into_response().status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::InvalidRequest("file name cannot be empty".into())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn file_limit_message_includes_limit() {
        assert_eq!(
            AppError::FileLimitExceeded(3).to_string(),
            "json file limit of 3 exceeded"
        );
    }
}
