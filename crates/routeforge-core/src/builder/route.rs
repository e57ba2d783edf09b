use super::{check_options, Endpoint};
use crate::error::BuildError;
use crate::export::RouteExport;
use crate::middleware::{LayerStack, MiddlewareLayer};
use crate::router::{join_paths, Router};
use routeforge_schema::{Schema, StringValue};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteOptions {
    /// `/`, or `/`-separated segments of word characters or `{param}`
    pub path: String,
}

impl From<&str> for RouteOptions {
    fn from(path: &str) -> Self {
        Self { path: path.to_string() }
    }
}

impl From<String> for RouteOptions {
    fn from(path: String) -> Self {
        Self { path }
    }
}

/// A path within a group, e.g. `/{id}`, holding one endpoint per method
#[derive(Clone)]
pub struct Route {
    options: RouteOptions,
    layers: LayerStack,
    endpoints: Vec<Endpoint>,
}

impl Route {
    pub fn new(options: impl Into<RouteOptions>) -> Self {
        Self {
            options: options.into(),
            layers: LayerStack::new(),
            endpoints: Vec::new(),
        }
    }

    pub fn layer(mut self, layer: impl MiddlewareLayer) -> Self {
        self.layers.push(Box::new(layer));
        self
    }

    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoints.push(endpoint);
        self
    }

    pub fn options(&self) -> &RouteOptions {
        &self.options
    }

    pub(crate) fn export(&self, group_path: &str) -> RouteExport {
        let path = join_paths([group_path, &self.options.path]);
        RouteExport {
            path: self.options.path.clone(),
            endpoints: self
                .endpoints
                .iter()
                .map(|endpoint| endpoint.export(&path))
                .collect(),
        }
    }

    pub(crate) async fn register(
        self,
        router: &mut Router,
        group_path: &str,
        outer: &LayerStack,
    ) -> Result<(), BuildError> {
        let options = check_options("Route", &self.options.path, &options_schema(), &self.options).await?;
        let path = join_paths([group_path, &options.path]);

        let mut layers = outer.clone();
        layers.extend(&self.layers);
        for endpoint in self.endpoints {
            endpoint.register(router, &path, &layers).await?;
        }
        Ok(())
    }
}

fn options_schema() -> Schema {
    Schema::new().with(StringValue::new("path").required().check_fn(
        |value| value.as_str().is_some_and(is_route_path),
        "The field \"path\" must be a path of word segments or {param} placeholders",
    ))
}

fn is_route_path(path: &str) -> bool {
    match path.strip_prefix('/') {
        Some("") => true,
        Some(rest) => rest.split('/').all(is_route_segment),
        None => false,
    }
}

fn is_route_segment(segment: &str) -> bool {
    let is_word =
        |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
        Some(param) => is_word(param),
        None => is_word(segment),
    }
}
