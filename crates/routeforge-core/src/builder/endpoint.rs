use super::check_options;
use crate::dispatch::{dispatcher, EndpointSchemas};
use crate::error::BuildError;
use crate::export::EndpointExport;
use crate::handler::{into_boxed_handler, BoxedHandler, Handler};
use crate::middleware::LayerStack;
use crate::router::{join_paths, Router};
use http::Method;
use routeforge_schema::{Schema, StringTest, StringValue};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Methods an endpoint may declare
const METHODS: [&str; 5] = ["GET", "POST", "PUT", "PATCH", "DELETE"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointOptions {
    pub name: String,
    pub description: String,
    /// Path below the route, `/` by default
    pub path: String,
    /// One of GET, POST, PUT, PATCH, DELETE, in any case
    pub method: String,
}

impl EndpointOptions {
    pub fn new(
        method: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            path: "/".to_string(),
            method: method.into(),
        }
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }
}

/// A controller bound to one method, with optional request schemas.
///
/// Schemas are consulted in the order params, query, body; the controller
/// only runs when all of them accept the request.
#[derive(Clone)]
pub struct Endpoint {
    options: EndpointOptions,
    controller: BoxedHandler,
    schemas: EndpointSchemas,
}

impl Endpoint {
    pub fn new<H: Handler>(options: EndpointOptions, controller: H) -> Self {
        Self {
            options,
            controller: into_boxed_handler(controller),
            schemas: EndpointSchemas::default(),
        }
    }

    /// Declare the path parameter schema
    pub fn param_schema(mut self, define: impl FnOnce(&mut Schema)) -> Self {
        self.schemas.params = Some(fresh_schema(define));
        self
    }

    /// Declare the query string schema
    pub fn query_schema(mut self, define: impl FnOnce(&mut Schema)) -> Self {
        self.schemas.query = Some(fresh_schema(define));
        self
    }

    /// Declare the JSON body schema
    pub fn body_schema(mut self, define: impl FnOnce(&mut Schema)) -> Self {
        self.schemas.body = Some(fresh_schema(define));
        self
    }

    pub fn options(&self) -> &EndpointOptions {
        &self.options
    }

    pub(crate) fn export(&self, route_path: &str) -> EndpointExport {
        EndpointExport {
            name: self.options.name.clone(),
            description: self.options.description.clone(),
            method: self.options.method.to_ascii_uppercase(),
            path: self.options.path.clone(),
            full_path: join_paths([route_path, &self.options.path]),
            params: self.schemas.params.as_ref().map(Schema::export),
            query: self.schemas.query.as_ref().map(Schema::export),
            body: self.schemas.body.as_ref().map(Schema::export),
        }
    }

    pub(crate) async fn register(
        self,
        router: &mut Router,
        route_path: &str,
        layers: &LayerStack,
    ) -> Result<(), BuildError> {
        let mut options = self.options;
        options.method = options.method.to_ascii_uppercase();
        let options = check_options("Endpoint", &options.name, &options_schema(), &options).await?;

        let method = Method::from_bytes(options.method.as_bytes()).map_err(|err| BuildError::Invalid {
            builder: "Endpoint",
            target: options.name.clone(),
            message: err.to_string(),
        })?;
        let path = join_paths([route_path, &options.path]);

        let handler = dispatcher(options.name.clone(), Arc::new(self.schemas), self.controller);
        router
            .insert(method, &path, &options.name, layers.clone().wrap(handler))
            .map_err(|err| BuildError::Conflict {
                method: err.method.to_string(),
                path: err.new_path.clone(),
                details: err.to_string(),
            })
    }
}

fn fresh_schema(define: impl FnOnce(&mut Schema)) -> Schema {
    let mut schema = Schema::new();
    define(&mut schema);
    schema
}

fn options_schema() -> Schema {
    let mut schema = Schema::new();
    schema
        .add_string(StringValue::new("name").required())
        .add_string(StringValue::new("description").required())
        .add_string(StringValue::new("path").required().test(StringTest::Path))
        .add_string(StringValue::new("method").required().options(METHODS));
    schema
}
