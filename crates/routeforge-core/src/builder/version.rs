use super::{check_options, Group};
use crate::error::BuildError;
use crate::export::VersionExport;
use crate::middleware::{LayerStack, MiddlewareLayer};
use crate::router::{join_paths, Router};
use routeforge_schema::{IntegerValue, Schema};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VersionOptions {
    pub version: u32,
}

impl VersionOptions {
    /// Mount point, `v<version>`
    pub(crate) fn segment(&self) -> String {
        format!("v{}", self.version)
    }
}

impl From<u32> for VersionOptions {
    fn from(version: u32) -> Self {
        Self { version }
    }
}

/// An API version, mounted at `/v<version>` under the base path
#[derive(Clone)]
pub struct Version {
    options: VersionOptions,
    layers: LayerStack,
    groups: Vec<Group>,
}

impl Version {
    pub fn new(options: impl Into<VersionOptions>) -> Self {
        Self {
            options: options.into(),
            layers: LayerStack::new(),
            groups: Vec::new(),
        }
    }

    pub fn layer(mut self, layer: impl MiddlewareLayer) -> Self {
        self.layers.push(Box::new(layer));
        self
    }

    pub fn group(mut self, group: Group) -> Self {
        self.groups.push(group);
        self
    }

    pub fn options(&self) -> &VersionOptions {
        &self.options
    }

    pub(crate) fn export(&self, base_path: &str) -> VersionExport {
        let path = join_paths([base_path, &self.options.segment()]);
        VersionExport {
            version: self.options.version,
            groups: self.groups.iter().map(|group| group.export(&path)).collect(),
            path,
        }
    }

    pub(crate) async fn register(
        self,
        router: &mut Router,
        base_path: &str,
        outer: &LayerStack,
    ) -> Result<(), BuildError> {
        let target = self.options.version.to_string();
        let options = check_options("Version", &target, &options_schema(), &self.options).await?;
        let path = join_paths([base_path, &options.segment()]);

        let mut layers = outer.clone();
        layers.extend(&self.layers);
        for group in self.groups {
            group.register(router, &path, &layers).await?;
        }
        Ok(())
    }
}

fn options_schema() -> Schema {
    Schema::new().with(IntegerValue::new("version").required().min(1))
}
