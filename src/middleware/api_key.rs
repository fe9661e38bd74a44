//! API key authentication middleware for the public surface.
//!
//! This middleware intercepts every `/public` request to:
//! 1. Extract the API key from the Authorization header
//! 2. Hash it and verify it exists in the database
//! 3. Touch the key's `last_used_at` timestamp
//! 4. Inject authentication context into the request

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{
    error::AppError, middleware::session::AuthContext, services::api_key_service,
    state::AppState,
};

/// API key authentication middleware function.
///
/// # Headers
///
/// Expected header format:
/// ```text
/// Authorization: Bearer abc123xyz
/// ```
///
/// # Returns
///
/// - `Ok(Response)` if authenticated successfully (calls next handler)
/// - `Err(AppError::InvalidApiKey)` if authentication fails (returns 401)
pub async fn api_key_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::InvalidApiKey)?;

    // Expected format: "Bearer <api_key>"
    let secret = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::InvalidApiKey)?;

    let key = api_key_service::authenticate(&state.pool, secret).await?;

    // Route handlers can now extract this using Extension<AuthContext>
    request
        .extensions_mut()
        .insert(AuthContext {
            user_id: key.user_id,
        });

    Ok(next.run(request).await)
}
