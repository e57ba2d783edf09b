//! Body size limit middleware
//!
//! The server already refuses to buffer more than its own limit. This layer
//! lets a part of the API accept less.

use super::{BoxedNext, MiddlewareLayer};
use crate::error::ApiError;
use crate::handler::BoxResponseFuture;
use crate::request::Request;
use crate::response::IntoResponse;

/// Bytes the server buffers per request unless the app is told otherwise
pub const DEFAULT_BODY_LIMIT: usize = 1 << 20;

/// Answers 413 when the buffered body or its declared `Content-Length`
/// is larger than `limit` bytes
///
/// The server refuses anything over [`App::with_body_limit`](crate::App::with_body_limit)
/// before routing, so this layer only has an effect when `limit` is lower
/// than the app's. Attach it to a version, group or route that should accept
/// less than the rest of the API.
#[derive(Clone)]
pub struct BodyLimitLayer {
    limit: usize,
}

impl BodyLimitLayer {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for BodyLimitLayer {
    fn default() -> Self {
        Self::new(DEFAULT_BODY_LIMIT)
    }
}

impl MiddlewareLayer for BodyLimitLayer {
    fn call(&self, req: Request, next: BoxedNext) -> BoxResponseFuture {
        let limit = self.limit;
        Box::pin(async move {
            let too_long = |length: usize| length > limit;
            let declared_too_long = req
                .headers()
                .get(http::header::CONTENT_LENGTH)
                .and_then(|value| value.to_str().ok()?.parse().ok())
                .is_some_and(too_long);

            if declared_too_long || too_long(req.raw_body().len()) {
                return ApiError::payload_too_large(limit).into_response();
            }

            next(req).await
        })
    }

    fn clone_box(&self) -> Box<dyn MiddlewareLayer> {
        Box::new(self.clone())
    }
}
