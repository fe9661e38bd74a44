//! API key management HTTP handlers.
//!
//! This module implements the key endpoints on the web surface:
//! - POST /apikeys - create a key, returning the secret exactly once
//! - GET /apikeys - list key metadata (never secrets)
//! - DELETE /apikeys/:keyHash - revoke a key

use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};

use crate::{
    error::AppError,
    extract::{Json, Path},
    middleware::session::AuthContext,
    models::api_key::{ApiKeyCreatedResponse, ApiKeyMetadataResponse, CreateApiKeyRequest},
    services::api_key_service,
    state::AppState,
};

/// Create a new API key.
///
/// # Endpoint
///
/// `POST /apikeys`
///
/// # Request Body
///
/// ```json
/// { "name": "production backend" }
/// ```
///
/// # Response (201 Created)
///
/// ```json
/// { "apiKey": "3f79...64 hex characters...ce" }
/// ```
///
/// The secret appears in this response and nowhere else, ever. Subsequent
/// listings only expose its hash.
pub async fn create_api_key(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateApiKeyRequest>,
) -> Result<impl IntoResponse, AppError> {
    let secret = api_key_service::create_api_key(&state.pool, auth.user_id, &request.name).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiKeyCreatedResponse { api_key: secret }),
    ))
}

/// List the authenticated user's API keys.
///
/// # Endpoint
///
/// `GET /apikeys`
///
/// # Response (200 OK)
///
/// ```json
/// [
///   {
///     "hash": "9c52...",
///     "name": "production backend",
///     "createdAt": "2025-06-01T10:00:00Z",
///     "lastUsedAt": "2025-06-02T08:15:00Z"
///   }
/// ]
/// ```
pub async fn list_api_keys(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<ApiKeyMetadataResponse>>, AppError> {
    let keys = api_key_service::list_api_keys(&state.pool, auth.user_id).await?;
    Ok(Json(keys))
}

/// Revoke an API key by its hash.
///
/// # Endpoint
///
/// `DELETE /apikeys/{keyHash}`
///
/// Returns 204 on success and 404 when the hash is unknown or belongs to a
/// different user.
pub async fn delete_api_key(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(key_hash): Path<String>,
) -> Result<StatusCode, AppError> {
    api_key_service::delete_api_key(&state.pool, auth.user_id, &key_hash).await?;
    Ok(StatusCode::NO_CONTENT)
}
