//! Session cookie authentication middleware.
//!
//! This middleware intercepts every web-surface request to:
//! 1. Extract the session token from the `session_token` cookie
//! 2. Hash it and verify the session exists and has not expired
//! 3. Inject authentication context into the request
//! 4. Reject unauthorized requests with HTTP 401

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    cookies, error::AppError, services::session_service, state::AppState,
};

/// Authentication context attached to authenticated requests.
///
/// This struct is inserted into the request's extension map and can be
/// extracted by route handlers to know who made the request. Both the
/// session and API key middleware produce it, so handlers shared between
/// surfaces do not care how the caller authenticated.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// ID of the authenticated user
    ///
    /// Used to filter database queries (e.g., only show this user's files)
    pub user_id: Uuid,
}

/// Session authentication middleware function.
///
/// # Flow
///
/// 1. Read the `session_token` cookie
/// 2. Validate the session (hash lookup, expiry, sliding renewal)
/// 3. If valid: inject `AuthContext` into request, call next handler
/// 4. If not: return 401 Unauthorized, which the client treats as logged out
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = cookies::get_cookie(request.headers(), cookies::SESSION_COOKIE)
        .ok_or(AppError::InvalidSession)?;

    let user = session_service::validate_session(&state.pool, &token).await?;

    request
        .extensions_mut()
        .insert(AuthContext { user_id: user.id });

    Ok(next.run(request).await)
}
