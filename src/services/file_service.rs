//! JSON document persistence.
//!
//! All queries filter by owner: a file id belonging to another user behaves
//! exactly like a file that does not exist.

use serde_json::Value;
use sqlx::types::Json;
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    models::json_file::{JsonFile, JsonFileMetadata},
};

const FILE_COLUMNS: &str = "id, user_id, file_name, content, created_at, updated_at";

/// Validate a user-supplied file name, returning it with surrounding
/// whitespace trimmed. Empty and whitespace-only names are rejected with 400.
pub fn normalize_file_name(name: &str) -> Result<&str, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidRequest(
            "file name cannot be empty".to_string(),
        ));
    }
    Ok(name)
}

/// Number of documents a user currently owns, for quota enforcement.
pub async fn count_files(pool: &DbPool, user_id: Uuid) -> Result<usize, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM json_files WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(count as usize)
}

/// Create a document with an empty object as its initial content.
pub async fn create_file(
    pool: &DbPool,
    user_id: Uuid,
    file_name: &str,
) -> Result<JsonFile, AppError> {
    let file = sqlx::query_as::<_, JsonFile>(&format!(
        r#"
        INSERT INTO json_files (user_id, file_name, content)
        VALUES ($1, $2, $3)
        RETURNING {FILE_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(file_name)
    .bind(Json(Value::Object(Default::default())))
    .fetch_one(pool)
    .await?;

    Ok(file)
}

/// Metadata for all of a user's documents, newest first. Content is not
/// fetched.
pub async fn list_files(pool: &DbPool, user_id: Uuid) -> Result<Vec<JsonFileMetadata>, AppError> {
    let files = sqlx::query_as::<_, JsonFileMetadata>(
        r#"
        SELECT id, user_id, file_name, updated_at
        FROM json_files
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(files)
}

/// Fetch a document (metadata and content) owned by the given user.
pub async fn get_file(pool: &DbPool, user_id: Uuid, file_id: Uuid) -> Result<JsonFile, AppError> {
    sqlx::query_as::<_, JsonFile>(&format!(
        "SELECT {FILE_COLUMNS} FROM json_files WHERE id = $1 AND user_id = $2"
    ))
    .bind(file_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("json file does not exist".to_string()))
}

/// Rename a document.
pub async fn rename_file(
    pool: &DbPool,
    user_id: Uuid,
    file_id: Uuid,
    file_name: &str,
) -> Result<JsonFile, AppError> {
    sqlx::query_as::<_, JsonFile>(&format!(
        r#"
        UPDATE json_files
        SET file_name = $3, updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING {FILE_COLUMNS}
        "#
    ))
    .bind(file_id)
    .bind(user_id)
    .bind(file_name)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("json file does not exist".to_string()))
}

/// Replace a document's content wholesale.
///
/// Last-writer-wins: there is no version token, and concurrent
/// saves overwrite each other. `updated_at` is bumped so metadata listings
/// and route derivation reflect the save.
pub async fn replace_content(
    pool: &DbPool,
    user_id: Uuid,
    file_id: Uuid,
    content: Value,
) -> Result<JsonFile, AppError> {
    sqlx::query_as::<_, JsonFile>(&format!(
        r#"
        UPDATE json_files
        SET content = $3, updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING {FILE_COLUMNS}
        "#
    ))
    .bind(file_id)
    .bind(user_id)
    .bind(Json(content))
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("json file does not exist".to_string()))
}

/// Delete a document.
pub async fn delete_file(pool: &DbPool, user_id: Uuid, file_id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM json_files WHERE id = $1 AND user_id = $2")
        .bind(file_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("json file does not exist".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_name_is_rejected() {
        assert!(matches!(
            normalize_file_name(""),
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[test]
    fn whitespace_only_file_name_is_rejected() {
        assert!(matches!(
            normalize_file_name("   \t\n"),
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[test]
    fn padded_file_name_is_trimmed() {
        assert_eq!(normalize_file_name("  inventory  ").unwrap(), "inventory");
    }

    #[test]
    fn plain_file_name_passes_through() {
        assert_eq!(normalize_file_name("inventory").unwrap(), "inventory");
    }
}
