//! Resource operations on stored JSON documents.
//!
//! These are the pure value-level semantics behind the public surface: every
//! derived route maps to one of these functions, applied to the document's
//! current content before the result (or mutated document) is persisted.
//!
//! # Id Matching
//!
//! Item lookup compares the string rendering of an item's `id` field with the
//! raw path segment, so `"users/1"` matches both `{"id": 1}` and
//! `{"id": "1"}`. Items without an `id` field never match.

use serde_json::{Map, Value};

use crate::error::AppError;

/// Fetch a top-level resource by key.
///
/// Errors: 400 if the document's top level is not an object, 404 if the key
/// is absent.
pub fn get_resource<'a>(content: &'a Value, resource: &str) -> Result<&'a Value, AppError> {
    top_level(content)?
        .get(resource)
        .ok_or_else(|| AppError::NotFound("resource does not exist in json".to_string()))
}

/// Replace a top-level resource with a new value, creating the key if it does
/// not exist yet.
pub fn replace_resource(
    content: &mut Value,
    resource: &str,
    new_value: Value,
) -> Result<(), AppError> {
    top_level_mut(content)?.insert(resource.to_string(), new_value);
    Ok(())
}

/// Shallow-merge a patch into an object-valued top-level resource.
///
/// Keys present in the patch overwrite the existing keys; everything else is
/// kept. Errors with 400 if the resource is missing or not an object.
pub fn merge_resource(
    content: &mut Value,
    resource: &str,
    patch: Map<String, Value>,
) -> Result<(), AppError> {
    let existing = top_level_mut(content)?
        .get_mut(resource)
        .and_then(Value::as_object_mut)
        .ok_or_else(|| AppError::InvalidRequest("resource is not an object".to_string()))?;
    for (key, value) in patch {
        existing.insert(key, value);
    }
    Ok(())
}

/// Find the first item in a collection whose `id` matches the path segment.
pub fn find_item<'a>(content: &'a Value, resource: &str, id: &str) -> Result<&'a Value, AppError> {
    let items = resource_array(content, resource)?;
    items
        .iter()
        .find(|item| id_matches(item, id))
        .ok_or_else(|| AppError::NotFound("resource with particular id not found".to_string()))
}

/// Append a new item to a collection resource.
pub fn append_item(
    content: &mut Value,
    resource: &str,
    item: Map<String, Value>,
) -> Result<(), AppError> {
    resource_array_mut(content, resource)?.push(Value::Object(item));
    Ok(())
}

/// Replace every item whose `id` matches. Errors with 404 when nothing
/// matched.
pub fn replace_item(
    content: &mut Value,
    resource: &str,
    id: &str,
    new_item: Map<String, Value>,
) -> Result<(), AppError> {
    let items = resource_array_mut(content, resource)?;
    let mut found = false;
    for item in items.iter_mut() {
        if id_matches(item, id) {
            *item = Value::Object(new_item.clone());
            found = true;
        }
    }
    if !found {
        return Err(AppError::NotFound(
            "cannot find resource item with given id".to_string(),
        ));
    }
    Ok(())
}

/// Shallow-merge a patch into every object item whose `id` matches.
pub fn merge_item(
    content: &mut Value,
    resource: &str,
    id: &str,
    patch: Map<String, Value>,
) -> Result<(), AppError> {
    let items = resource_array_mut(content, resource)?;
    let mut found = false;
    for item in items.iter_mut() {
        if id_matches(item, id) {
            if let Some(map) = item.as_object_mut() {
                for (key, value) in patch.clone() {
                    map.insert(key, value);
                }
                found = true;
            }
        }
    }
    if !found {
        return Err(AppError::NotFound(
            "cannot find resource item with given id".to_string(),
        ));
    }
    Ok(())
}

/// Remove the first item whose `id` matches.
pub fn delete_item(content: &mut Value, resource: &str, id: &str) -> Result<(), AppError> {
    let items = resource_array_mut(content, resource)?;
    let index = items
        .iter()
        .position(|item| id_matches(item, id))
        .ok_or_else(|| {
            AppError::NotFound("cannot find resource item with given id".to_string())
        })?;
    items.remove(index);
    Ok(())
}

fn top_level(content: &Value) -> Result<&Map<String, Value>, AppError> {
    content
        .as_object()
        .ok_or_else(|| AppError::InvalidRequest("json file is not an object".to_string()))
}

fn top_level_mut(content: &mut Value) -> Result<&mut Map<String, Value>, AppError> {
    content
        .as_object_mut()
        .ok_or_else(|| AppError::InvalidRequest("json file is not an object".to_string()))
}

fn resource_array<'a>(content: &'a Value, resource: &str) -> Result<&'a Vec<Value>, AppError> {
    get_resource(content, resource)?
        .as_array()
        .ok_or_else(|| AppError::InvalidRequest("resource is not an array".to_string()))
}

fn resource_array_mut<'a>(
    content: &'a mut Value,
    resource: &str,
) -> Result<&'a mut Vec<Value>, AppError> {
    top_level_mut(content)?
        .get_mut(resource)
        .ok_or_else(|| AppError::NotFound("resource does not exist in json".to_string()))?
        .as_array_mut()
        .ok_or_else(|| AppError::InvalidRequest("resource is not an array".to_string()))
}

/// Compare an item's `id` field with the requested path segment.
///
/// Numbers and booleans are compared via their canonical string rendering, so
/// the path segment `1` matches `{"id": 1}`; floats render as serde_json
/// prints them (`1.5`), which is also what a caller would type into a URL.
fn id_matches(item: &Value, wanted: &str) -> bool {
    match item.get("id") {
        Some(Value::String(s)) => s == wanted,
        Some(Value::Number(n)) => n.to_string() == wanted,
        Some(Value::Bool(b)) => b.to_string() == wanted,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> Value {
        json!({
            "users": [
                {"id": 1, "name": "a"},
                {"id": "2", "name": "b"},
                {"name": "no id"}
            ],
            "settings": {"theme": "dark", "lang": "en"},
            "count": 3
        })
    }

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn get_resource_unwraps_parent_key() {
        let content = doc();
        let users = get_resource(&content, "users").unwrap();
        assert!(users.is_array());
        assert_eq!(users.as_array().unwrap().len(), 3);
    }

    #[test]
    fn get_missing_resource_is_not_found() {
        let err = get_resource(&doc(), "ghosts").unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn get_resource_on_scalar_document_is_invalid() {
        let err = get_resource(&json!([1, 2]), "users").unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[test]
    fn find_item_matches_numeric_id_from_string_segment() {
        let content = doc();
        let item = find_item(&content, "users", "1").unwrap();
        assert_eq!(item["name"], "a");
    }

    #[test]
    fn find_item_matches_string_id() {
        let content = doc();
        let item = find_item(&content, "users", "2").unwrap();
        assert_eq!(item["name"], "b");
    }

    #[test]
    fn find_item_unknown_id_is_not_found() {
        let err = find_item(&doc(), "users", "99").unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn items_without_id_never_match() {
        // the third user has no id field; nothing should match an empty segment
        let err = find_item(&doc(), "users", "").unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn find_item_on_non_array_resource_is_invalid() {
        let err = find_item(&doc(), "settings", "1").unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[test]
    fn append_item_grows_collection() {
        let mut content = doc();
        append_item(&mut content, "users", obj(json!({"id": 4}))).unwrap();
        assert_eq!(content["users"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn replace_item_swaps_matching_items() {
        let mut content = doc();
        replace_item(&mut content, "users", "1", obj(json!({"id": 1, "name": "z"}))).unwrap();
        assert_eq!(content["users"][0]["name"], "z");
    }

    #[test]
    fn merge_item_keeps_unpatched_fields() {
        let mut content = doc();
        merge_item(&mut content, "users", "1", obj(json!({"role": "admin"}))).unwrap();
        assert_eq!(content["users"][0]["name"], "a");
        assert_eq!(content["users"][0]["role"], "admin");
    }

    #[test]
    fn delete_item_removes_first_match_only() {
        let mut content = json!({"users": [{"id": 1}, {"id": 1}]});
        delete_item(&mut content, "users", "1").unwrap();
        assert_eq!(content["users"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn replace_resource_creates_or_overwrites() {
        let mut content = doc();
        replace_resource(&mut content, "count", json!(10)).unwrap();
        assert_eq!(content["count"], 10);
        replace_resource(&mut content, "fresh", json!(["x"])).unwrap();
        assert_eq!(content["fresh"][0], "x");
    }

    #[test]
    fn merge_resource_shallow_merges_objects() {
        let mut content = doc();
        merge_resource(&mut content, "settings", obj(json!({"theme": "light"}))).unwrap();
        assert_eq!(content["settings"]["theme"], "light");
        assert_eq!(content["settings"]["lang"], "en");
    }

    #[test]
    fn merge_resource_rejects_non_object_target() {
        let mut content = doc();
        let err = merge_resource(&mut content, "count", obj(json!({"a": 1}))).unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }
}
