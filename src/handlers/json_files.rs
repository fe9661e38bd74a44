//! JSON document HTTP handlers (web surface).
//!
//! This module implements the document endpoints used by the browser app:
//! - POST /jsonfiles - create a document
//! - GET /jsonfiles - list document metadata
//! - GET /jsonfiles/:fileId - fetch document content
//! - GET /jsonfiles/:fileId/metadata - fetch document metadata
//! - PATCH /jsonfiles/:fileId - rename
//! - PUT /jsonfiles/:fileId - replace content
//! - DELETE /jsonfiles/:fileId - delete
//! - GET /jsonfiles/:fileId/routes - derived public routes

use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    error::AppError,
    extract::{Json, Path},
    middleware::session::AuthContext,
    models::json_file::{
        CreateJsonFileRequest, DerivedRoute, JsonFileMetadataResponse, RenameJsonFileRequest,
    },
    services::{file_service, route_service},
    state::AppState,
};

/// Create a new JSON document.
///
/// # Endpoint
///
/// `POST /jsonfiles`
///
/// # Request Body
///
/// ```json
/// { "fileName": "inventory" }
/// ```
///
/// # Validation & Quota
///
/// - An empty or whitespace-only name is rejected with 400 before any
///   database write
/// - The user's plan limits how many documents they may own; exceeding it
///   yields 403 with the limit in the message
///
/// # Response (201 Created)
///
/// Returns the new document's metadata. Content starts as `{}`.
pub async fn create_file(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateJsonFileRequest>,
) -> Result<impl IntoResponse, AppError> {
    let file_name = file_service::normalize_file_name(&request.file_name)?;

    let subscribed: bool = sqlx::query_scalar("SELECT subscribed FROM users WHERE id = $1")
        .bind(auth.user_id)
        .fetch_one(&state.pool)
        .await?;
    let limit = state.config.file_limit(subscribed);

    if file_service::count_files(&state.pool, auth.user_id).await? >= limit {
        return Err(AppError::FileLimitExceeded(limit));
    }

    let file = file_service::create_file(&state.pool, auth.user_id, file_name).await?;

    Ok((
        StatusCode::CREATED,
        Json(JsonFileMetadataResponse::from(file)),
    ))
}

/// List metadata for all of the user's documents, newest first.
///
/// # Endpoint
///
/// `GET /jsonfiles`
///
/// # Response (200 OK)
///
/// ```json
/// [
///   {
///     "id": "550e8400-e29b-41d4-a716-446655440000",
///     "userId": "660e8400-e29b-41d4-a716-446655440001",
///     "fileName": "inventory",
///     "modifiedAt": "2025-06-01T10:00:00Z"
///   }
/// ]
/// ```
pub async fn list_files(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<JsonFileMetadataResponse>>, AppError> {
    let files = file_service::list_files(&state.pool, auth.user_id).await?;
    Ok(Json(files.into_iter().map(Into::into).collect()))
}

/// Fetch a document's content.
///
/// # Endpoint
///
/// `GET /jsonfiles/{fileId}`
///
/// Returns the stored JSON value as-is. 404 when the file does not exist or
/// belongs to another user.
pub async fn get_file(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(file_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let file = file_service::get_file(&state.pool, auth.user_id, file_id).await?;
    Ok(Json(file.content.0))
}

/// Fetch a document's metadata.
///
/// # Endpoint
///
/// `GET /jsonfiles/{fileId}/metadata`
pub async fn get_file_metadata(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(file_id): Path<Uuid>,
) -> Result<Json<JsonFileMetadataResponse>, AppError> {
    let file = file_service::get_file(&state.pool, auth.user_id, file_id).await?;
    Ok(Json(file.into()))
}

/// Rename a document.
///
/// # Endpoint
///
/// `PATCH /jsonfiles/{fileId}`
///
/// # Request Body
///
/// ```json
/// { "fileName": "inventory-v2" }
/// ```
///
/// Empty names are rejected with 400, matching creation.
pub async fn rename_file(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(file_id): Path<Uuid>,
    Json(request): Json<RenameJsonFileRequest>,
) -> Result<Json<JsonFileMetadataResponse>, AppError> {
    let file_name = file_service::normalize_file_name(&request.file_name)?;

    let file = file_service::rename_file(&state.pool, auth.user_id, file_id, file_name).await?;
    Ok(Json(file.into()))
}

/// Replace a document's content.
///
/// # Endpoint
///
/// `PUT /jsonfiles/{fileId}`
///
/// The body is the new document value: any JSON is accepted at the top
/// level. Last-writer-wins; there is no version token, and the derived
/// route list reflects the new shape immediately.
///
/// # Response (200 OK)
///
/// The stored content, echoing what was saved.
pub async fn update_file(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(file_id): Path<Uuid>,
    Json(content): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let file = file_service::replace_content(&state.pool, auth.user_id, file_id, content).await?;
    Ok(Json(file.content.0))
}

/// Delete a document.
///
/// # Endpoint
///
/// `DELETE /jsonfiles/{fileId}`
///
/// Returns 204 No Content.
pub async fn delete_file(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(file_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    file_service::delete_file(&state.pool, auth.user_id, file_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List the public routes derived from a document's current shape.
///
/// # Endpoint
///
/// `GET /jsonfiles/{fileId}/routes`
///
/// # Response (200 OK)
///
/// ```json
/// [
///   {
///     "method": "GET",
///     "url": "/public/550e8400-e29b-41d4-a716-446655440000/users",
///     "description": "Get all users"
///   }
/// ]
/// ```
///
/// Computed on the fly from the stored value, so the list always reflects
/// the latest save. Scalar-only documents yield an empty list, not an
/// error.
pub async fn get_routes(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(file_id): Path<Uuid>,
) -> Result<Json<Vec<DerivedRoute>>, AppError> {
    let file = file_service::get_file(&state.pool, auth.user_id, file_id).await?;
    Ok(Json(route_service::derive_routes(file.id, &file.content.0)))
}
