//! Dynamic route derivation.
//!
//! Given a document's current JSON value, this module computes the list of
//! REST endpoints the public surface will serve for it. The list is a pure
//! function of (file id, value): it is recomputed on every request, never
//! persisted, and the same value always yields the identical ordered list.
//!
//! # Derivation Rules
//!
//! Only a top-level JSON object produces routes; arrays and scalars at the
//! top level yield an empty list rather than an error. Each top-level key is
//! inspected:
//!
//! - **array** values become collection resources with item-level CRUD
//! - **object** values become singleton resources (get/replace/merge)
//! - **scalar/null** values can only be fetched or replaced
//!
//! Keys that cannot appear literally in a URL path segment are skipped
//! entirely: empty keys, keys containing whitespace, and keys containing the
//! reserved characters `/`, `?`, `#`, or `%`. This is a documented,
//! user-visible limitation.

use serde_json::Value;
use uuid::Uuid;

use crate::models::json_file::DerivedRoute;

/// Compute the public routes for a document.
///
/// Iterates the top-level keys in declaration order (the JSON parser is
/// configured to preserve it), so the route list is stable across refetches
/// of an unchanged document.
pub fn derive_routes(file_id: Uuid, value: &Value) -> Vec<DerivedRoute> {
    let Value::Object(map) = value else {
        // scalar or array documents have no addressable sub-resources
        return Vec::new();
    };

    let mut routes = Vec::new();
    for (key, val) in map {
        if !key_is_routable(key) {
            // keys like "big data" or "a/b" would produce an unmatchable url
            continue;
        }
        let base = format!("/public/{file_id}/{key}");
        match val {
            Value::Array(_) => {
                push(&mut routes, "GET", &base, format!("Get all {key}"));
                push(
                    &mut routes,
                    "GET",
                    &format!("{base}/:id"),
                    format!("Get a single {key} by id"),
                );
                push(
                    &mut routes,
                    "POST",
                    &base,
                    format!("Add a new item to {key}"),
                );
                push(
                    &mut routes,
                    "PUT",
                    &format!("{base}/:id"),
                    format!("Replace an item in {key} by id"),
                );
                push(
                    &mut routes,
                    "PATCH",
                    &format!("{base}/:id"),
                    format!("Partially update an item in {key} by id"),
                );
                push(
                    &mut routes,
                    "DELETE",
                    &format!("{base}/:id"),
                    format!("Delete an item from {key} by id"),
                );
            }
            Value::Object(_) => {
                push(&mut routes, "GET", &base, format!("Get the {key} resource"));
                push(
                    &mut routes,
                    "PUT",
                    &base,
                    format!("Replace the {key} resource"),
                );
                push(
                    &mut routes,
                    "PATCH",
                    &base,
                    format!("Partially update the {key} resource"),
                );
            }
            Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null => {
                push(&mut routes, "GET", &base, format!("Get the {key} value"));
                push(
                    &mut routes,
                    "PUT",
                    &base,
                    format!("Replace the {key} value"),
                );
            }
        }
    }
    routes
}

/// Whether a key can appear literally as a URL path segment.
fn key_is_routable(key: &str) -> bool {
    !key.is_empty()
        && !key
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#' | '%'))
}

fn push(routes: &mut Vec<DerivedRoute>, method: &str, url: &str, description: String) {
    routes.push(DerivedRoute {
        method: method.to_string(),
        url: url.to_string(),
        description,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn file_id() -> Uuid {
        Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap()
    }

    #[test]
    fn array_key_yields_collection_and_item_routes() {
        let value = json!({"users": [{"id": 1, "name": "a"}]});
        let routes = derive_routes(file_id(), &value);

        let gets: Vec<_> = routes.iter().filter(|r| r.method == "GET").collect();
        assert_eq!(gets.len(), 2);
        assert_eq!(
            gets[0].url,
            "/public/550e8400-e29b-41d4-a716-446655440000/users"
        );
        assert_eq!(gets[0].description, "Get all users");
        assert_eq!(
            gets[1].url,
            "/public/550e8400-e29b-41d4-a716-446655440000/users/:id"
        );
        assert_eq!(gets[1].description, "Get a single users by id");

        // full CRUD on array items
        let methods: Vec<_> = routes.iter().map(|r| r.method.as_str()).collect();
        assert_eq!(methods, ["GET", "GET", "POST", "PUT", "PATCH", "DELETE"]);
    }

    #[test]
    fn whitespace_keys_are_skipped() {
        let value = json!({
            "users": [{"id": 1, "name": "a"}],
            "big data": [{"id": 2}]
        });
        let routes = derive_routes(file_id(), &value);

        assert!(routes.iter().any(|r| r.url.ends_with("/users")));
        assert!(!routes.iter().any(|r| r.url.contains("big")));
        // tab and newline count as whitespace too
        let value = json!({"a\tb": [], "a\nb": {}});
        assert!(derive_routes(file_id(), &value).is_empty());
    }

    #[test]
    fn empty_key_is_skipped() {
        let value = json!({"": [1, 2]});
        assert!(derive_routes(file_id(), &value).is_empty());
    }

    #[test]
    fn url_reserved_keys_are_skipped() {
        // these can never match a single path segment literally
        let value = json!({
            "a/b": [{"id": 1}],
            "a?b": {},
            "a#b": 1,
            "a%b": [],
            "users": [{"id": 1}]
        });
        let routes = derive_routes(file_id(), &value);
        assert!(routes.iter().all(|r| r.url.ends_with("/users") || r.url.ends_with("/users/:id")));
        assert_eq!(routes.len(), 6);
    }

    #[test]
    fn object_key_yields_singleton_routes() {
        let value = json!({"settings": {"theme": "dark"}});
        let routes = derive_routes(file_id(), &value);

        let methods: Vec<_> = routes.iter().map(|r| r.method.as_str()).collect();
        assert_eq!(methods, ["GET", "PUT", "PATCH"]);
        assert!(routes.iter().all(|r| r.url.ends_with("/settings")));
    }

    #[test]
    fn scalar_keys_yield_get_and_put() {
        let value = json!({"count": 3, "title": "x", "flag": true, "nothing": null});
        let routes = derive_routes(file_id(), &value);
        assert_eq!(routes.len(), 8);
        assert!(
            routes
                .iter()
                .all(|r| r.method == "GET" || r.method == "PUT")
        );
    }

    #[test]
    fn non_object_top_level_yields_no_routes() {
        assert!(derive_routes(file_id(), &json!([1, 2, 3])).is_empty());
        assert!(derive_routes(file_id(), &json!("scalar")).is_empty());
        assert!(derive_routes(file_id(), &json!(42)).is_empty());
        assert!(derive_routes(file_id(), &json!(null)).is_empty());
    }

    #[test]
    fn derivation_is_stable_across_calls() {
        let value = json!({
            "users": [{"id": 1}],
            "settings": {"theme": "dark"},
            "version": 2
        });
        let first = derive_routes(file_id(), &value);
        let second = derive_routes(file_id(), &value);
        assert_eq!(first, second);
    }

    #[test]
    fn routes_follow_key_declaration_order() {
        let value: Value = serde_json::from_str(r#"{"zebra": 1, "alpha": 1}"#).unwrap();
        let routes = derive_routes(file_id(), &value);
        assert!(routes[0].url.ends_with("/zebra"));
        assert!(routes[2].url.ends_with("/alpha"));
    }
}
