//! Request validation in front of a controller
//!
//! Every endpoint is served through a dispatcher that turns the raw request
//! into three JSON objects and validates them in a fixed order:
//!
//! 1. `params` - path parameters, as strings
//! 2. `query` - the query string, as strings (repeated keys become arrays)
//! 3. `body` - the JSON body, which must be an object (empty means `{}`)
//!
//! The first failure is answered with `400 {"status": 400, "message": ...}`
//! and the controller never runs.

use crate::error::ApiError;
use crate::handler::{BoxResponseFuture, BoxedHandler};
use crate::middleware::BoxedNext;
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use bytes::Bytes;
use futures_util::FutureExt;
use routeforge_schema::Schema;
use serde_json::{Map, Value as Json};
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error};

const BODY_NOT_OBJECT: &str = "The request body must be a JSON object.";

/// Schemas declared on one endpoint
#[derive(Debug, Clone, Default)]
pub(crate) struct EndpointSchemas {
    pub params: Option<Schema>,
    pub query: Option<Schema>,
    pub body: Option<Schema>,
}

/// Wrap a controller so it only sees validated requests
pub(crate) fn dispatcher(
    endpoint: String,
    schemas: Arc<EndpointSchemas>,
    controller: BoxedHandler,
) -> BoxedNext {
    let endpoint: Arc<str> = endpoint.into();
    Arc::new(move |req: Request| {
        let endpoint = endpoint.clone();
        let schemas = schemas.clone();
        let controller = controller.clone();
        Box::pin(execute(endpoint, schemas, controller, req)) as BoxResponseFuture
    })
}

async fn execute(
    endpoint: Arc<str>,
    schemas: Arc<EndpointSchemas>,
    controller: BoxedHandler,
    mut req: Request,
) -> Response {
    if let Err(err) = prepare(&schemas, &mut req).await {
        debug!(endpoint = %endpoint, status = %err.status.as_u16(), error = %err.message, "request rejected");
        return err.into_response();
    }

    match AssertUnwindSafe(async move { controller(req).await })
        .catch_unwind()
        .await
    {
        Ok(response) => response,
        Err(panic) => {
            error!(endpoint = %endpoint, panic = %panic_message(&*panic), "controller panicked");
            ApiError::internal("Internal server error").into_response()
        }
    }
}

/// Build and validate params, query and body, in that order
async fn prepare(schemas: &EndpointSchemas, req: &mut Request) -> Result<(), ApiError> {
    let params = path_object(&req.path_params);
    req.params = validate_part(schemas.params.as_ref(), params).await?;

    let query = query_object(req.query_string())?;
    req.query = validate_part(schemas.query.as_ref(), query).await?;

    req.body = match &schemas.body {
        Some(schema) => schema.validate(&body_object(&req.raw_body)?).await?,
        // Without a body schema a non-JSON payload stays reachable through raw_body()
        None => body_object(&req.raw_body).unwrap_or_default(),
    };
    Ok(())
}

async fn validate_part(
    schema: Option<&Schema>,
    data: Map<String, Json>,
) -> Result<Map<String, Json>, ApiError> {
    match schema {
        Some(schema) => Ok(schema.validate(&data).await?),
        None => Ok(data),
    }
}

fn path_object(path_params: &HashMap<String, String>) -> Map<String, Json> {
    path_params
        .iter()
        .map(|(name, value)| (name.clone(), Json::String(value.clone())))
        .collect()
}

fn query_object(query: Option<&str>) -> Result<Map<String, Json>, ApiError> {
    let mut object = Map::new();
    let Some(query) = query else {
        return Ok(object);
    };

    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)
        .map_err(|err| ApiError::bad_request(format!("The query string could not be parsed: {err}")))?;

    for (key, value) in pairs {
        match object.get_mut(&key) {
            Some(Json::Array(values)) => values.push(Json::String(value)),
            Some(existing) => {
                let first = existing.take();
                *existing = Json::Array(vec![first, Json::String(value)]);
            }
            None => {
                object.insert(key, Json::String(value));
            }
        }
    }
    Ok(object)
}

fn body_object(raw: &Bytes) -> Result<Map<String, Json>, ApiError> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Json>(raw) {
        Ok(Json::Object(object)) => Ok(object),
        _ => Err(ApiError::bad_request(BODY_NOT_OBJECT)),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
