//! Authentication HTTP handlers.
//!
//! This module implements the login flow and account endpoints:
//! - GET /auth/google/login - redirect the browser to Google's consent page
//! - GET /auth/google/callback - complete the handshake, mint a session
//! - GET /me - current user identity
//! - PUT /logout - end the session
//! - DELETE /users - delete the account and everything it owns

use axum::{
    Extension, Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse, Redirect},
};
use serde::Deserialize;

use crate::{
    cookies,
    error::AppError,
    middleware::session::AuthContext,
    models::user::{User, UserResponse},
    services::{oauth_service, session_service},
    state::AppState,
};

/// Query parameters Google appends to the callback redirect.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub state: String,
    pub code: String,
}

/// Begin the OAuth flow.
///
/// # Endpoint
///
/// `GET /auth/google/login`
///
/// Generates a random `state`, stores it in a short-lived cookie scoped to
/// the callback path, and redirects (307) to Google's consent URL carrying
/// the same state.
pub async fn google_login(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let oauth_state = oauth_service::generate_state();
    let url = oauth_service::auth_url(&state.config, &oauth_state)?;
    let secure = state.config.base_url.starts_with("https");

    Ok((
        AppendHeaders([(
            SET_COOKIE,
            cookies::oauth_state_cookie(&oauth_state, secure),
        )]),
        Redirect::temporary(&url),
    ))
}

/// Complete the OAuth flow.
///
/// # Endpoint
///
/// `GET /auth/google/callback?state=...&code=...`
///
/// # Flow
///
/// 1. The `state` query parameter must match the `oauthstate` cookie
/// 2. Exchange the authorization code for an access token
/// 3. Fetch the Google profile and upsert the user by provider id
/// 4. Mint a session, set the `session_token` cookie
/// 5. Redirect to the web app
///
/// A state mismatch is a 400: it means the redirect did not originate from
/// a login this server started.
pub async fn google_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Result<impl IntoResponse, AppError> {
    let cookie_state = cookies::get_cookie(&headers, cookies::OAUTH_STATE_COOKIE)
        .ok_or_else(|| AppError::InvalidRequest("state cookie not found".to_string()))?;
    if cookie_state != params.state {
        return Err(AppError::InvalidRequest("invalid state".to_string()));
    }

    let access_token =
        oauth_service::exchange_code(&state.http, &state.config, &params.code).await?;
    let info = oauth_service::fetch_user_info(&state.http, &access_token).await?;
    let user = oauth_service::upsert_user(&state.pool, &info).await?;
    tracing::info!(user_id = %user.id, email = %user.email, "user logged in");

    let (token, _session) = session_service::create_session(&state.pool, user.id).await?;
    let secure = state.config.base_url.starts_with("https");

    Ok((
        AppendHeaders([
            (SET_COOKIE, cookies::session_cookie(&token, secure)),
            (SET_COOKIE, cookies::clear_oauth_state_cookie(secure)),
        ]),
        Redirect::to(&format!("{}/app", state.config.client_url)),
    ))
}

/// Current user identity.
///
/// # Endpoint
///
/// `GET /me`
///
/// # Response (200 OK)
///
/// ```json
/// { "id": "...", "email": "ada@example.com", "name": "Ada Lovelace" }
/// ```
///
/// A missing or expired session never reaches this handler; the middleware
/// answers 401 and the client treats that as logged out.
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<UserResponse>, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, provider_id, email, name, stripe_customer_id, subscribed, created_at, updated_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(auth.user_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

    Ok(Json(user.into()))
}

/// End the current session.
///
/// # Endpoint
///
/// `PUT /logout`
///
/// Deletes the session row and clears the cookie. Returns 204; logging out
/// twice is not an error.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    if let Some(token) = cookies::get_cookie(&headers, cookies::SESSION_COOKIE) {
        session_service::invalidate_session(&state.pool, &token).await?;
    }
    let secure = state.config.base_url.starts_with("https");

    Ok((
        StatusCode::NO_CONTENT,
        AppendHeaders([(SET_COOKIE, cookies::clear_session_cookie(secure))]),
    ))
}

/// Delete the authenticated user's account.
///
/// # Endpoint
///
/// `DELETE /users`
///
/// Cascades to sessions, API keys, and JSON files. Returns 204 with the
/// session cookie cleared.
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<impl IntoResponse, AppError> {
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(auth.user_id)
        .execute(&state.pool)
        .await?;
    let secure = state.config.base_url.starts_with("https");

    Ok((
        StatusCode::NO_CONTENT,
        AppendHeaders([(SET_COOKIE, cookies::clear_session_cookie(secure))]),
    ))
}
