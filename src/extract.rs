//! Request extractors that keep rejections inside the error envelope.
//!
//! Axum's built-in `Json` and `Path` extractors reject malformed input with
//! plain-text bodies, bypassing [`AppError`]'s JSON envelope. These wrappers
//! delegate to the built-ins and convert any rejection into
//! `AppError::InvalidRequest`, so a client sending a broken JSON body or a
//! non-UUID file id still gets `{"error": "..."}` like every other failure.

use axum::{
    extract::{
        FromRequest, FromRequestParts, Request,
        rejection::{JsonRejection, PathRejection},
    },
    http::request::Parts,
    response::{IntoResponse, Response},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::AppError;

/// JSON body extractor; also usable as a JSON response, like `axum::Json`.
pub struct Json<T>(pub T);

impl<S, T> FromRequest<S> for Json<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| AppError::InvalidRequest(rejection.body_text()))?;
        Ok(Self(value))
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Path parameter extractor.
pub struct Path<T>(pub T);

impl<S, T> FromRequestParts<S> for Path<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Path(value) = axum::extract::Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: PathRejection| AppError::InvalidRequest(rejection.body_text()))?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
        routing::{get, post},
    };
    use serde_json::Value;
    use tower::ServiceExt;
    use uuid::Uuid;

    async fn echo(Json(value): Json<Value>) -> Json<Value> {
        Json(value)
    }

    async fn by_id(Path(id): Path<Uuid>) -> Json<String> {
        Json(id.to_string())
    }

    async fn error_body(response: axum::response::Response) -> (StatusCode, Value) {
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn malformed_json_body_keeps_error_envelope() {
        let app = Router::new().route("/docs", post(echo));
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/docs")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        let (status, body) = error_body(response).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.get("error").and_then(Value::as_str).is_some());
    }

    #[tokio::test]
    async fn well_formed_body_passes_through() {
        let app = Router::new().route("/docs", post(echo));
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/docs")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"a": 1}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn non_uuid_path_param_keeps_error_envelope() {
        let app = Router::new().route("/docs/{id}", get(by_id));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/docs/not-a-uuid")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let (status, body) = error_body(response).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.get("error").and_then(Value::as_str).is_some());
    }
}
