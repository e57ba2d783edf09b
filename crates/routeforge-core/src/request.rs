//! Request types for routeforge

use crate::error::ApiError;
use bytes::Bytes;
use http::{request::Parts, Extensions, HeaderMap, Method, Uri};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as Json};
use std::collections::HashMap;

/// HTTP request handed to middleware and controllers.
///
/// Middleware sees the raw pieces only. Controllers additionally get the
/// validated and defaulted `params()`, `query()` and `body()` objects.
pub struct Request {
    pub(crate) parts: Parts,
    pub(crate) raw_body: Bytes,
    pub(crate) path_params: HashMap<String, String>,
    pub(crate) params: Map<String, Json>,
    pub(crate) query: Map<String, Json>,
    pub(crate) body: Map<String, Json>,
}

impl Request {
    pub(crate) fn new(parts: Parts, raw_body: Bytes, path_params: HashMap<String, String>) -> Self {
        Self {
            parts,
            raw_body,
            path_params,
            params: Map::new(),
            query: Map::new(),
            body: Map::new(),
        }
    }

    /// Get the HTTP method
    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    /// Get the URI
    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    /// Get the headers
    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// Get request extensions
    pub fn extensions(&self) -> &Extensions {
        &self.parts.extensions
    }

    /// Get mutable extensions, for middleware handing data to controllers
    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.parts.extensions
    }

    /// Get the request path
    pub fn path(&self) -> &str {
        self.parts.uri.path()
    }

    /// Get the query string
    pub fn query_string(&self) -> Option<&str> {
        self.parts.uri.query()
    }

    /// Raw body bytes as received
    pub fn raw_body(&self) -> &Bytes {
        &self.raw_body
    }

    /// Path parameters as matched by the router
    pub fn path_params(&self) -> &HashMap<String, String> {
        &self.path_params
    }

    /// Validated path parameters
    pub fn params(&self) -> &Map<String, Json> {
        &self.params
    }

    /// Validated query parameters
    pub fn query(&self) -> &Map<String, Json> {
        &self.query
    }

    /// Validated JSON body
    pub fn body(&self) -> &Map<String, Json> {
        &self.body
    }

    /// Get a single validated path parameter
    pub fn param(&self, name: &str) -> Option<&Json> {
        self.params.get(name)
    }

    /// Deserialize a single path parameter.
    ///
    /// Path parameters are strings on the wire; a string holding a number is
    /// also accepted where a number is expected.
    pub fn param_as<T: DeserializeOwned>(&self, name: &str) -> Result<T, ApiError> {
        let value = self
            .params
            .get(name)
            .ok_or_else(|| ApiError::bad_request(format!("Missing path parameter \"{name}\"")))?;
        decode_scalar(value)
            .map_err(|err| ApiError::bad_request(format!("Invalid path parameter \"{name}\": {err}")))
    }

    /// Deserialize the validated query into `T`
    pub fn query_as<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_value(Json::Object(self.query.clone()))
            .map_err(|err| ApiError::bad_request(format!("Invalid query: {err}")))
    }

    /// Deserialize the validated body into `T`
    pub fn body_as<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_value(Json::Object(self.body.clone()))
            .map_err(|err| ApiError::bad_request(format!("Invalid body: {err}")))
    }
}

fn decode_scalar<T: DeserializeOwned>(value: &Json) -> Result<T, serde_json::Error> {
    match serde_json::from_value(value.clone()) {
        Ok(decoded) => Ok(decoded),
        Err(err) => match value.as_str().map(serde_json::from_str::<Json>) {
            Some(Ok(parsed)) => serde_json::from_value(parsed),
            _ => Err(err),
        },
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.parts.method)
            .field("uri", &self.parts.uri)
            .field("path_params", &self.path_params)
            .finish()
    }
}

#[cfg(test)]
pub(crate) fn test_request(method: Method, uri: &str, body: impl Into<Bytes>) -> Request {
    let (parts, _) = http::Request::builder()
        .method(method)
        .uri(uri)
        .body(())
        .unwrap()
        .into_parts();
    Request::new(parts, body.into(), HashMap::new())
}
