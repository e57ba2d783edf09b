//! Middleware infrastructure for routeforge
//!
//! Middleware is attached with `.layer()` on any builder level. An endpoint
//! runs inside the layers of its api, version, group and route, in that
//! order (outermost first).
//!
//! # Example
//!
//! ```rust,ignore
//! use routeforge::prelude::*;
//!
//! let api = Api::new(ApiOptions::new("Pets", "Pet store"))
//!     .layer(BodyLimitLayer::new(64 * 1024))
//!     .layer(from_fn(|req: Request, next: BoxedNext| async move {
//!         tracing::info!(path = %req.path(), "incoming");
//!         next(req).await
//!     }));
//! ```

mod body_limit;
mod layer;

pub use body_limit::{BodyLimitLayer, DEFAULT_BODY_LIMIT};
pub use layer::{from_fn, BoxedNext, FnLayer, LayerStack, MiddlewareLayer};
