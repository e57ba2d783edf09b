use super::{check_options, Version};
use crate::app::App;
use crate::error::BuildError;
use crate::export::ApiExport;
use crate::middleware::{LayerStack, MiddlewareLayer};
use crate::router::Router;
use routeforge_schema::{Schema, StringTest, StringValue};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Options of the [`Api`] root
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiOptions {
    pub name: String,
    pub description: String,
    /// Prefix for every version, `/` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
}

impl ApiOptions {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            base_path: None,
        }
    }

    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    fn base_path_or_root(&self) -> &str {
        self.base_path.as_deref().unwrap_or("/")
    }
}

/// Root of an API definition
#[derive(Clone)]
pub struct Api {
    options: ApiOptions,
    layers: LayerStack,
    versions: Vec<Version>,
}

impl Api {
    pub fn new(options: ApiOptions) -> Self {
        Self {
            options,
            layers: LayerStack::new(),
            versions: Vec::new(),
        }
    }

    /// Add middleware wrapping every endpoint of the API
    pub fn layer(mut self, layer: impl MiddlewareLayer) -> Self {
        self.layers.push(Box::new(layer));
        self
    }

    pub fn version(mut self, version: Version) -> Self {
        self.versions.push(version);
        self
    }

    pub fn options(&self) -> &ApiOptions {
        &self.options
    }

    /// Describe the tree as declared. Does not validate anything.
    pub fn export(&self) -> ApiExport {
        let base_path = self.options.base_path_or_root();
        ApiExport {
            name: self.options.name.clone(),
            description: self.options.description.clone(),
            base_path: base_path.to_string(),
            versions: self
                .versions
                .iter()
                .map(|version| version.export(base_path))
                .collect(),
        }
    }

    /// Validate every builder and register all endpoints.
    ///
    /// Fails on the first invalid option set or conflicting route.
    pub async fn build(self) -> Result<App, BuildError> {
        let export = self.export();
        let options = check_options("Api", &self.options.name, &options_schema(), &self.options).await?;
        let base_path = options.base_path_or_root();

        let mut router = Router::new();
        for version in self.versions {
            version.register(&mut router, base_path, &self.layers).await?;
        }

        info!(api = %options.name, routes = router.routes().len(), "api built");
        Ok(App::new(router, export))
    }
}

fn options_schema() -> Schema {
    let mut schema = Schema::new();
    schema
        .add_string(StringValue::new("name").required().min(1))
        .add_string(StringValue::new("description").required())
        .add_string(
            StringValue::new("basePath")
                .test(StringTest::Path)
                .default_value("/"),
        );
    schema
}
