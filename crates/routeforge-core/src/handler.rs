//! Controller trait and type-erased handlers

use crate::request::Request;
use crate::response::{IntoResponse, Response};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future resolving to a response
pub type BoxResponseFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// An async controller: `async fn(Request) -> impl IntoResponse`.
///
/// ```rust,ignore
/// async fn show_pet(req: Request) -> Result<Json<Pet>, ApiError> {
///     let id: u64 = req.param_as("id")?;
///     Ok(Json(find_pet(id)?))
/// }
/// ```
pub trait Handler: Clone + Send + Sync + Sized + 'static {
    /// The response future
    type Future: Future<Output = Response> + Send + 'static;

    /// Call the controller with the request
    fn call(self, req: Request) -> Self::Future;
}

impl<F, Fut, Res> Handler for F
where
    F: FnOnce(Request) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Res> + Send + 'static,
    Res: IntoResponse,
{
    type Future = BoxResponseFuture;

    fn call(self, req: Request) -> Self::Future {
        Box::pin(async move { self(req).await.into_response() })
    }
}

// Type-erased handler for storage in the router
pub(crate) type BoxedHandler = Arc<dyn Fn(Request) -> BoxResponseFuture + Send + Sync>;

/// Create a boxed handler from any Handler
pub(crate) fn into_boxed_handler<H: Handler>(handler: H) -> BoxedHandler {
    Arc::new(move |req| {
        let handler = handler.clone();
        Box::pin(handler.call(req)) as BoxResponseFuture
    })
}
