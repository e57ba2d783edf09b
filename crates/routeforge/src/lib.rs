//! # routeforge
//!
//! Declarative HTTP APIs with request validation built in.
//!
//! An API is a tree of builders: `Api` > `Version` > `Group` > `Route` >
//! `Endpoint`. Each endpoint may declare schemas for its path parameters,
//! query string and JSON body; a request only reaches the controller once
//! all three validated, with defaults filled in. The first broken rule is
//! answered with `400 {"status": 400, "message": "The field \"name\" ..."}`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use routeforge::prelude::*;
//!
//! async fn create_pet(req: Request) -> Result<Created<serde_json::Value>> {
//!     Ok(Created(serde_json::Value::Object(req.body().clone())))
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let api = Api::new(ApiOptions::new("petstore", "A pet store")).version(
//!         Version::new(1).group(
//!             Group::new(GroupOptions::new("pets", "/pets")).route(
//!                 Route::new("/").endpoint(
//!                     Endpoint::new(EndpointOptions::new("POST", "createPet", "Add a pet"), create_pet)
//!                         .body_schema(|schema| {
//!                             schema.add_string(StringValue::new("name").required().min(1));
//!                         }),
//!                 ),
//!             ),
//!         ),
//!     );
//!
//!     // `serve`, `export` or `check`, configured from routeforge.json
//!     routeforge::run(api).await
//! }
//! ```

pub mod cli;
pub mod config;
pub mod export;
pub mod logging;

pub use routeforge_core::*;

/// Schema declarations and validation
pub use routeforge_schema as schema;

pub use config::{ConfigError, LogConfig, LogFormat, ProjectConfig};
pub use export::{write_export, ExportError};
pub use logging::init_logging;

/// Parse the command line and run the selected command against `api`
pub async fn run(api: Api) -> anyhow::Result<()> {
    use clap::Parser;
    cli::Cli::parse().execute(api).await
}

/// Prelude module - import everything you need with `use routeforge::prelude::*`
pub mod prelude {
    pub use routeforge_core::{
        from_fn, Api, ApiError, ApiOptions, BodyLimitLayer, BoxedNext, BuildError, Created,
        Endpoint, EndpointOptions, Group, GroupOptions, IntoResponse, Json, MiddlewareLayer,
        NoContent, Request, Response, Result, Route, RouteOptions, StatusCode, Version,
        VersionOptions,
    };
    pub use routeforge_schema::prelude::*;

    pub use serde::{Deserialize, Serialize};
    pub use tracing::{debug, error, info, trace, warn};
}

// Re-export commonly used external crates
pub use serde;
pub use serde_json;
pub use tokio;
pub use tracing;
