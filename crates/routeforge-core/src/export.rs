//! Serializable description of an API tree
//!
//! This is the `api.json` document read by the documentation site generator.
//! It is derived from the builder options as declared, so it can be produced
//! without building the API.

use routeforge_schema::SchemaDescriptor;
use serde::Serialize;

/// Top of the exported tree
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiExport {
    pub name: String,
    pub description: String,
    pub base_path: String,
    pub versions: Vec<VersionExport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VersionExport {
    pub version: u32,
    /// Mount point, e.g. `/v1`
    pub path: String,
    pub groups: Vec<GroupExport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupExport {
    pub name: String,
    pub description: String,
    pub path: String,
    pub routes: Vec<RouteExport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteExport {
    pub path: String,
    pub endpoints: Vec<EndpointExport>,
}

/// One endpoint, with its full mounted path and declared schemas
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointExport {
    pub name: String,
    pub description: String,
    pub method: String,
    pub path: String,
    pub full_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<SchemaDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<SchemaDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<SchemaDescriptor>,
}

impl ApiExport {
    /// Every endpoint in the tree, depth first
    pub fn endpoints(&self) -> impl Iterator<Item = &EndpointExport> {
        self.versions
            .iter()
            .flat_map(|version| &version.groups)
            .flat_map(|group| &group.routes)
            .flat_map(|route| &route.endpoints)
    }

    /// Pretty-printed JSON
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
