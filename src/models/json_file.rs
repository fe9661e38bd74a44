//! JSON document models, metadata responses, and derived route records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use uuid::Uuid;

/// Represents a JSON document record from the database.
///
/// # Database Table
///
/// Maps to the `json_files` table. The content column uses the Postgres
/// `JSON` type rather than `JSONB`: the stored text keeps its top-level key
/// order, and route derivation iterates keys in declaration order.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct JsonFile {
    /// Unique identifier for this document
    pub id: Uuid,

    /// User that owns this document
    ///
    /// Every query filters by `user_id` so one user can never address
    /// another user's files.
    pub user_id: Uuid,

    /// Display name chosen by the user; must be non-empty
    pub file_name: String,

    /// The document value itself; any JSON at the top level
    pub content: Json<Value>,

    /// Timestamp when the document was created
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last content replacement or rename
    pub updated_at: DateTime<Utc>,
}

/// Metadata-only projection of a document, used by list endpoints so content
/// blobs are not dragged through every listing query.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct JsonFileMetadata {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a document.
///
/// ```json
/// { "fileName": "inventory" }
/// ```
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJsonFileRequest {
    pub file_name: String,
}

/// Request body for renaming a document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameJsonFileRequest {
    pub file_name: String,
}

/// Metadata response for document endpoints.
///
/// ```json
/// {
///   "id": "550e8400-e29b-41d4-a716-446655440000",
///   "userId": "660e8400-e29b-41d4-a716-446655440001",
///   "fileName": "inventory",
///   "modifiedAt": "2025-06-01T10:00:00Z"
/// }
/// ```
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonFileMetadataResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    pub modified_at: DateTime<Utc>,
}

impl From<JsonFileMetadata> for JsonFileMetadataResponse {
    fn from(file: JsonFileMetadata) -> Self {
        Self {
            id: file.id,
            user_id: file.user_id,
            file_name: file.file_name,
            modified_at: file.updated_at,
        }
    }
}

impl From<JsonFile> for JsonFileMetadataResponse {
    fn from(file: JsonFile) -> Self {
        Self {
            id: file.id,
            user_id: file.user_id,
            file_name: file.file_name,
            modified_at: file.updated_at,
        }
    }
}

/// One REST endpoint derived from a document's shape.
///
/// Returned by `GET /jsonfiles/{fileId}/routes` and rendered by the client as
/// example API calls.
///
/// ```json
/// {
///   "method": "GET",
///   "url": "/public/550e8400-e29b-41d4-a716-446655440000/users/:id",
///   "description": "Get a single users by id"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedRoute {
    pub method: String,
    pub url: String,
    pub description: String,
}
