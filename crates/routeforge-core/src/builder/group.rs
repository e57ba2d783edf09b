use super::{check_options, Route};
use crate::error::BuildError;
use crate::export::GroupExport;
use crate::middleware::{LayerStack, MiddlewareLayer};
use crate::router::{join_paths, Router};
use routeforge_schema::{Schema, StringTest, StringValue};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupOptions {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub path: String,
}

impl GroupOptions {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            path: path.into(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// A named set of routes sharing a path prefix, e.g. `/pets`
#[derive(Clone)]
pub struct Group {
    options: GroupOptions,
    layers: LayerStack,
    routes: Vec<Route>,
}

impl Group {
    pub fn new(options: GroupOptions) -> Self {
        Self {
            options,
            layers: LayerStack::new(),
            routes: Vec::new(),
        }
    }

    pub fn layer(mut self, layer: impl MiddlewareLayer) -> Self {
        self.layers.push(Box::new(layer));
        self
    }

    pub fn route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    pub fn options(&self) -> &GroupOptions {
        &self.options
    }

    pub(crate) fn export(&self, version_path: &str) -> GroupExport {
        let path = join_paths([version_path, &self.options.path]);
        GroupExport {
            name: self.options.name.clone(),
            description: self.options.description.clone(),
            path: self.options.path.clone(),
            routes: self.routes.iter().map(|route| route.export(&path)).collect(),
        }
    }

    pub(crate) async fn register(
        self,
        router: &mut Router,
        version_path: &str,
        outer: &LayerStack,
    ) -> Result<(), BuildError> {
        let options = check_options("Group", &self.options.name, &options_schema(), &self.options).await?;
        let path = join_paths([version_path, &options.path]);

        let mut layers = outer.clone();
        layers.extend(&self.layers);
        for route in self.routes {
            route.register(router, &path, &layers).await?;
        }
        Ok(())
    }
}

fn options_schema() -> Schema {
    let mut schema = Schema::new();
    schema
        .add_string(StringValue::new("name").required().min(1))
        .add_string(StringValue::new("description"))
        .add_string(StringValue::new("path").required().test(StringTest::Path));
    schema
}
