//! Declarative API tree: `Api` > `Version` > `Group` > `Route` > `Endpoint`
//!
//! Builders only record what they are given. Their options are checked
//! against small local schemas when [`Api::build`] runs, and the first broken
//! rule stops the build with a [`BuildError`].
//!
//! ```rust,ignore
//! let app = Api::new(ApiOptions::new("petstore", "A pet store").base_path("/api"))
//!     .version(
//!         Version::new(1).group(
//!             Group::new(GroupOptions::new("pets", "/pets")).route(
//!                 Route::new("/{id}").endpoint(
//!                     Endpoint::new(EndpointOptions::new("GET", "showPet", "Show a pet"), show_pet)
//!                         .param_schema(|schema| {
//!                             schema.add_string(StringValue::new("id").required());
//!                         }),
//!                 ),
//!             ),
//!         ),
//!     )
//!     .build()
//!     .await?;
//! ```

mod api;
mod endpoint;
mod group;
mod route;
mod version;

pub use api::{Api, ApiOptions};
pub use endpoint::{Endpoint, EndpointOptions};
pub use group::{Group, GroupOptions};
pub use route::{Route, RouteOptions};
pub use version::{Version, VersionOptions};

use crate::error::BuildError;
use routeforge_schema::Schema;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Validate builder options, returning them with defaults applied
pub(crate) async fn check_options<T>(
    builder: &'static str,
    target: &str,
    schema: &Schema,
    options: &T,
) -> Result<T, BuildError>
where
    T: Serialize + DeserializeOwned,
{
    let invalid = |err: serde_json::Error| BuildError::Invalid {
        builder,
        target: target.to_string(),
        message: err.to_string(),
    };

    let value = serde_json::to_value(options).map_err(invalid)?;
    let checked = schema
        .validate_value(&value)
        .await
        .map_err(|err| BuildError::from_schema(builder, target, err))?;
    serde_json::from_value(checked).map_err(invalid)
}
