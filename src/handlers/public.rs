//! Public surface HTTP handlers: the derived routes themselves.
//!
//! Bearer-key gated endpoints under `/public` that serve slices of a user's
//! JSON documents:
//! - GET /public/:fileId - whole document
//! - GET|PUT|PATCH /public/:fileId/:resource - top-level resource
//! - POST /public/:fileId/:resource - append an item to a collection
//! - GET|PUT|PATCH|DELETE /public/:fileId/:resource/:id - collection item
//!
//! Every mutation rewrites the stored document, so the next `/routes` fetch
//! on the web surface reflects the new shape.

use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    error::AppError,
    extract::{Json, Path},
    middleware::session::AuthContext,
    services::{file_service, resource_service},
    state::AppState,
};

/// Fetch the whole document.
///
/// # Endpoint
///
/// `GET /public/{fileId}`
pub async fn get_file(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(file_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let file = file_service::get_file(&state.pool, auth.user_id, file_id).await?;
    Ok(Json(file.content.0))
}

/// Fetch a top-level resource, unwrapped of its parent key.
///
/// # Endpoint
///
/// `GET /public/{fileId}/{resource}`
///
/// For `{"users": [...]}`, `GET /users` returns the bare array. 404 when
/// the key does not exist; 400 when the document's top level is not an
/// object.
pub async fn get_resource(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((file_id, resource)): Path<(Uuid, String)>,
) -> Result<Json<Value>, AppError> {
    let file = file_service::get_file(&state.pool, auth.user_id, file_id).await?;
    let data = resource_service::get_resource(&file.content.0, &resource)?;
    Ok(Json(data.clone()))
}

/// Replace a top-level resource.
///
/// # Endpoint
///
/// `PUT /public/{fileId}/{resource}`
///
/// # Response (200 OK)
///
/// The whole updated document.
pub async fn update_resource(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((file_id, resource)): Path<(Uuid, String)>,
    Json(new_value): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let file = file_service::get_file(&state.pool, auth.user_id, file_id).await?;
    let mut content = file.content.0;
    resource_service::replace_resource(&mut content, &resource, new_value)?;
    let saved = file_service::replace_content(&state.pool, auth.user_id, file_id, content).await?;
    Ok(Json(saved.content.0))
}

/// Shallow-merge a patch into an object-valued resource.
///
/// # Endpoint
///
/// `PATCH /public/{fileId}/{resource}`
pub async fn patch_resource(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((file_id, resource)): Path<(Uuid, String)>,
    Json(patch): Json<Map<String, Value>>,
) -> Result<Json<Value>, AppError> {
    let file = file_service::get_file(&state.pool, auth.user_id, file_id).await?;
    let mut content = file.content.0;
    resource_service::merge_resource(&mut content, &resource, patch)?;
    let saved = file_service::replace_content(&state.pool, auth.user_id, file_id, content).await?;
    Ok(Json(saved.content.0))
}

/// Fetch a single collection item by id.
///
/// # Endpoint
///
/// `GET /public/{fileId}/{resource}/{id}`
///
/// The id path segment is compared against the string rendering of each
/// item's `id` field, so `/users/1` matches `{"id": 1}` and `{"id": "1"}`
/// alike. 404 when nothing matches.
pub async fn get_resource_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((file_id, resource, id)): Path<(Uuid, String, String)>,
) -> Result<Json<Value>, AppError> {
    let file = file_service::get_file(&state.pool, auth.user_id, file_id).await?;
    let item = resource_service::find_item(&file.content.0, &resource, &id)?;
    Ok(Json(item.clone()))
}

/// Append an item to a collection resource.
///
/// # Endpoint
///
/// `POST /public/{fileId}/{resource}`
///
/// # Response (201 Created)
///
/// The whole updated document.
pub async fn create_resource_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((file_id, resource)): Path<(Uuid, String)>,
    Json(item): Json<Map<String, Value>>,
) -> Result<impl IntoResponse, AppError> {
    let file = file_service::get_file(&state.pool, auth.user_id, file_id).await?;
    let mut content = file.content.0;
    resource_service::append_item(&mut content, &resource, item)?;
    let saved = file_service::replace_content(&state.pool, auth.user_id, file_id, content).await?;
    Ok((StatusCode::CREATED, Json(saved.content.0)))
}

/// Replace a collection item by id.
///
/// # Endpoint
///
/// `PUT /public/{fileId}/{resource}/{id}`
pub async fn update_resource_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((file_id, resource, id)): Path<(Uuid, String, String)>,
    Json(new_item): Json<Map<String, Value>>,
) -> Result<Json<Value>, AppError> {
    let file = file_service::get_file(&state.pool, auth.user_id, file_id).await?;
    let mut content = file.content.0;
    resource_service::replace_item(&mut content, &resource, &id, new_item)?;
    let saved = file_service::replace_content(&state.pool, auth.user_id, file_id, content).await?;
    Ok(Json(saved.content.0))
}

/// Shallow-merge a patch into a collection item by id.
///
/// # Endpoint
///
/// `PATCH /public/{fileId}/{resource}/{id}`
pub async fn patch_resource_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((file_id, resource, id)): Path<(Uuid, String, String)>,
    Json(patch): Json<Map<String, Value>>,
) -> Result<Json<Value>, AppError> {
    let file = file_service::get_file(&state.pool, auth.user_id, file_id).await?;
    let mut content = file.content.0;
    resource_service::merge_item(&mut content, &resource, &id, patch)?;
    let saved = file_service::replace_content(&state.pool, auth.user_id, file_id, content).await?;
    Ok(Json(saved.content.0))
}

/// Remove a collection item by id.
///
/// # Endpoint
///
/// `DELETE /public/{fileId}/{resource}/{id}`
///
/// # Response (200 OK)
///
/// The whole updated document.
pub async fn delete_resource_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((file_id, resource, id)): Path<(Uuid, String, String)>,
) -> Result<Json<Value>, AppError> {
    let file = file_service::get_file(&state.pool, auth.user_id, file_id).await?;
    let mut content = file.content.0;
    resource_service::delete_item(&mut content, &resource, &id)?;
    let saved = file_service::replace_content(&state.pool, auth.user_id, file_id, content).await?;
    Ok(Json(saved.content.0))
}
