//! Response types for routeforge
//!
//! Controllers return anything implementing [`IntoResponse`].
//!
//! | Type | Status | Content-Type |
//! |------|--------|--------------|
//! | `String` / `&str` | 200 | text/plain |
//! | `()` | 200 | - |
//! | [`Json<T>`] | 200 | application/json |
//! | [`Created<T>`] | 201 | application/json |
//! | [`NoContent`] | 204 | - |
//! | `(StatusCode, R)` | given | as `R` |
//! | [`ApiError`] | varies | application/json |

use crate::error::{ApiError, ErrorBody};
use bytes::Bytes;
use http::{header, HeaderValue, StatusCode};
use http_body_util::Full;
use serde::Serialize;

/// HTTP Response type
pub type Response = http::Response<Full<Bytes>>;

/// Trait for types that can be converted into an HTTP response
pub trait IntoResponse {
    /// Convert self into a Response
    fn into_response(self) -> Response;
}

fn with_body(status: StatusCode, content_type: Option<&'static str>, body: Bytes) -> Response {
    let mut response = http::Response::new(Full::new(body));
    *response.status_mut() = status;
    if let Some(content_type) = content_type {
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
    response
}

fn json_body<T: Serialize>(status: StatusCode, value: &T) -> Response {
    match serde_json::to_vec(value) {
        Ok(body) => with_body(status, Some("application/json"), Bytes::from(body)),
        Err(err) => ApiError::internal("Failed to serialize response")
            .with_internal(err.to_string())
            .into_response(),
    }
}

impl IntoResponse for Response {
    fn into_response(self) -> Response {
        self
    }
}

impl IntoResponse for () {
    fn into_response(self) -> Response {
        with_body(StatusCode::OK, None, Bytes::new())
    }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response {
        with_body(StatusCode::OK, Some("text/plain; charset=utf-8"), Bytes::from(self))
    }
}

impl IntoResponse for String {
    fn into_response(self) -> Response {
        with_body(StatusCode::OK, Some("text/plain; charset=utf-8"), Bytes::from(self))
    }
}

impl IntoResponse for StatusCode {
    fn into_response(self) -> Response {
        with_body(self, None, Bytes::new())
    }
}

impl<R: IntoResponse> IntoResponse for (StatusCode, R) {
    fn into_response(self) -> Response {
        let mut response = self.1.into_response();
        *response.status_mut() = self.0;
        response
    }
}

impl<T: IntoResponse, E: IntoResponse> IntoResponse for Result<T, E> {
    fn into_response(self) -> Response {
        match self {
            Ok(v) => v.into_response(),
            Err(e) => e.into_response(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Some(internal) = &self.internal {
            tracing::error!(error_type = %self.error_type, details = %internal, "{}", self.message);
        }
        json_body(self.status, &ErrorBody::from(&self))
    }
}

/// JSON response with 200 OK
#[derive(Debug, Clone)]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        json_body(StatusCode::OK, &self.0)
    }
}

/// JSON response with 201 Created
#[derive(Debug, Clone)]
pub struct Created<T>(pub T);

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        json_body(StatusCode::CREATED, &self.0)
    }
}

/// 204 No Content response
#[derive(Debug, Clone, Copy)]
pub struct NoContent;

impl IntoResponse for NoContent {
    fn into_response(self) -> Response {
        with_body(StatusCode::NO_CONTENT, None, Bytes::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::json;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn api_error_renders_status_and_message() {
        let response = ApiError::bad_request("The field \"name\" has not been provided.")
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(
            body_json(response).await,
            json!({"status": 400, "message": "The field \"name\" has not been provided."})
        );
    }

    #[tokio::test]
    async fn internal_details_stay_private() {
        let response = ApiError::internal("Internal error")
            .with_internal("db password rejected")
            .into_response();
        let body = body_json(response).await;
        assert_eq!(body, json!({"status": 500, "message": "Internal error"}));
    }

    #[tokio::test]
    async fn status_tuple_overrides_status() {
        let response = (StatusCode::ACCEPTED, Json(json!({"queued": true}))).into_response();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(body_json(response).await, json!({"queued": true}));
        assert_eq!(NoContent.into_response().status(), StatusCode::NO_CONTENT);
        assert_eq!(Created(1).into_response().status(), StatusCode::CREATED);
    }
}
