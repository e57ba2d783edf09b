//! # routeforge core
//!
//! HTTP plumbing and the declarative API builder for routeforge.
//!
//! An API is a tree `Api` > `Version` > `Group` > `Route` > `Endpoint`.
//! [`Api::build`] validates every builder's options, then registers each
//! endpoint behind a validation shim that checks path parameters, query and
//! JSON body against the endpoint's schemas before the controller runs.
//!
//! This crate is not meant to be used directly. Use `routeforge` instead.

mod app;
mod builder;
mod dispatch;
mod error;
mod export;
mod handler;
pub mod middleware;
mod request;
mod response;
mod router;
mod server;
#[cfg(any(test, feature = "test-utils"))]
mod test_client;

pub use app::App;
pub use builder::{
    Api, ApiOptions, Endpoint, EndpointOptions, Group, GroupOptions, Route, RouteOptions, Version,
    VersionOptions,
};
pub use error::{ApiError, BuildError, Result};
pub use export::{ApiExport, EndpointExport, GroupExport, RouteExport, VersionExport};
pub use handler::{BoxResponseFuture, Handler};
pub use middleware::{from_fn, BodyLimitLayer, BoxedNext, MiddlewareLayer, DEFAULT_BODY_LIMIT};
pub use request::Request;
pub use response::{Created, IntoResponse, Json, NoContent, Response};
pub use router::{RouteConflictError, RouteInfo};
pub use server::ServeError;
#[cfg(any(test, feature = "test-utils"))]
pub use test_client::{TestClient, TestRequest, TestResponse};

pub use http::{Method, StatusCode};
