//! In-process client for exercising a built [`App`] in tests
//!
//! Requests go through the same routing, middleware and validation pipeline
//! as the real server; only the socket is skipped.
//!
//! # Example
//!
//! ```rust,ignore
//! use routeforge_core::{Api, TestClient};
//!
//! #[tokio::test]
//! async fn lists_pets() {
//!     let app = petstore_api().build().await.unwrap();
//!     let client = TestClient::new(&app);
//!
//!     client.get("/v1/pets").await.assert_status(200);
//! }
//! ```

use crate::app::App;
use crate::error::ApiError;
use crate::response::{IntoResponse, Response};
use crate::router::Router;
use crate::server::route_request;
use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use http_body_util::BodyExt;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

/// Test client dispatching requests to a built [`App`]
pub struct TestClient {
    router: Arc<Router>,
    body_limit: usize,
}

impl TestClient {
    pub fn new(app: &App) -> Self {
        Self {
            router: app.router(),
            body_limit: app.body_limit(),
        }
    }

    /// GET `path`, which may include a query string
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(TestRequest::get(path)).await
    }

    /// POST `body` serialized as JSON
    ///
    /// ```rust,ignore
    /// let response = client.post_json("/v1/pets", &json!({"name": "Rex"})).await;
    /// ```
    pub async fn post_json<T: Serialize>(&self, path: &str, body: &T) -> TestResponse {
        self.request(TestRequest::post(path).json(body)).await
    }

    /// Dispatch an arbitrary [`TestRequest`]
    pub async fn request(&self, req: TestRequest) -> TestResponse {
        let body = req.body.unwrap_or_default();
        if body.len() > self.body_limit {
            let refused = ApiError::payload_too_large(self.body_limit).into_response();
            return TestResponse::collect(refused).await;
        }

        let mut head = http::Request::builder().method(req.method).uri(req.path.as_str());
        if let Some(headers) = head.headers_mut() {
            headers.extend(req.headers);
        }
        let response = match head.body(()) {
            Ok(request) => route_request(&self.router, request.into_parts().0, body).await,
            Err(err) => {
                ApiError::bad_request(format!("Invalid test request: {err}")).into_response()
            }
        };
        TestResponse::collect(response).await
    }
}

/// Request under construction for [`TestClient::request`]
#[derive(Debug, Clone)]
pub struct TestRequest {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl TestRequest {
    /// Create a request; `path` may carry a query string
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: &str) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: &str) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: &str) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: &str) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Add a header; invalid names or values are ignored
    pub fn header(mut self, key: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            key.parse::<header::HeaderName>(),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Set a JSON body and `Content-Type: application/json`
    pub fn json<T: Serialize>(self, body: &T) -> Self {
        match serde_json::to_vec(body) {
            Ok(encoded) => self.body(encoded).content_type("application/json"),
            Err(_) => self,
        }
    }

    /// Set the raw body
    pub fn body(self, body: impl Into<Bytes>) -> Self {
        Self {
            body: Some(body.into()),
            ..self
        }
    }

    pub fn content_type(mut self, mime: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(mime) {
            self.headers.insert(header::CONTENT_TYPE, value);
        }
        self
    }
}

/// Collected response with assertion helpers
#[derive(Debug)]
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    async fn collect(response: Response) -> Self {
        let (head, payload) = response.into_parts();
        let body = match payload.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(never) => match never {},
        };
        Self {
            status: head.status,
            headers: head.headers,
            body,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body as text, lossy on invalid UTF-8
    pub fn text(&self) -> String {
        String::from_utf8_lossy(self.body.as_ref()).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(self.body.as_ref())
    }

    /// Panics unless the response carries `expected`
    pub fn assert_status<S>(&self, expected: S) -> &Self
    where
        S: TryInto<StatusCode>,
        S::Error: std::fmt::Debug,
    {
        let expected = expected
            .try_into()
            .unwrap_or_else(|err| panic!("invalid expected status: {err:?}"));
        assert_eq!(
            self.status,
            expected,
            "status mismatch for response body {}",
            self.text()
        );
        self
    }

    /// Assert a header value
    ///
    /// # Panics
    ///
    /// Panics if the header is missing or differs.
    pub fn assert_header(&self, key: &str, expected: &str) -> &Self {
        let actual = self
            .headers
            .get(key)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");
        assert_eq!(
            actual, expected,
            "header {key} mismatch"
        );
        self
    }

    /// Assert the body equals `expected` as JSON
    ///
    /// # Panics
    ///
    /// Panics if the body is not JSON or differs.
    pub fn assert_json(&self, expected: &serde_json::Value) -> &Self {
        let actual: serde_json::Value = match self.json() {
            Ok(actual) => actual,
            Err(err) => panic!("Response body is not JSON ({err}): {}", self.text()),
        };
        assert_eq!(&actual, expected, "JSON body mismatch");
        self
    }

    /// Assert an error body `{"status": <status>, "message": <message>}`
    ///
    /// # Panics
    ///
    /// Panics if the status or message differs.
    pub fn assert_error(&self, status: u16, message: &str) -> &Self {
        self.assert_status(status);
        self.assert_json(&serde_json::json!({ "status": status, "message": message }))
    }
}
