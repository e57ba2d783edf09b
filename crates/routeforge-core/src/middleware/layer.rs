//! Middleware layers and the onion-ordered layer stack

use crate::handler::BoxResponseFuture;
use crate::request::Request;
use std::future::Future;
use std::sync::Arc;

/// The rest of the chain, as seen by a middleware
pub type BoxedNext = Arc<dyn Fn(Request) -> BoxResponseFuture + Send + Sync>;

/// Middleware that can wrap endpoints.
///
/// Attach with `.layer()` on an `Api`, `Version`, `Group` or `Route`.
pub trait MiddlewareLayer: Send + Sync + 'static {
    /// Handle `req`, calling `next` to continue the chain
    fn call(&self, req: Request, next: BoxedNext) -> BoxResponseFuture;

    /// Clone this middleware into a boxed trait object
    fn clone_box(&self) -> Box<dyn MiddlewareLayer>;
}

impl Clone for Box<dyn MiddlewareLayer> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Middleware built from an async closure.
///
/// ```rust,ignore
/// let audit = from_fn(|req: Request, next: BoxedNext| async move {
///     tracing::info!(path = %req.path(), "audit");
///     next(req).await
/// });
/// ```
pub struct FnLayer<F> {
    f: Arc<F>,
}

impl<F> Clone for FnLayer<F> {
    fn clone(&self) -> Self {
        Self { f: self.f.clone() }
    }
}

/// Build a middleware from an async closure taking the request and `next`
pub fn from_fn<F, Fut>(f: F) -> FnLayer<F>
where
    F: Fn(Request, BoxedNext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = crate::response::Response> + Send + 'static,
{
    FnLayer { f: Arc::new(f) }
}

impl<F, Fut> MiddlewareLayer for FnLayer<F>
where
    F: Fn(Request, BoxedNext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = crate::response::Response> + Send + 'static,
{
    fn call(&self, req: Request, next: BoxedNext) -> BoxResponseFuture {
        Box::pin((self.f)(req, next))
    }

    fn clone_box(&self) -> Box<dyn MiddlewareLayer> {
        Box::new(self.clone())
    }
}

/// A stack of middleware layers
#[derive(Clone, Default)]
pub struct LayerStack {
    layers: Vec<Box<dyn MiddlewareLayer>>,
}

impl LayerStack {
    /// Create a new empty layer stack
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Add a middleware layer to the stack
    ///
    /// Layers are executed in the order they are added (outermost first).
    pub fn push(&mut self, layer: Box<dyn MiddlewareLayer>) {
        self.layers.push(layer);
    }

    /// Append every layer of `inner`, which then runs inside this stack
    pub fn extend(&mut self, inner: &LayerStack) {
        self.layers.extend(inner.layers.iter().cloned());
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Execute the middleware stack with a final handler
    pub fn execute(&self, req: Request, handler: BoxedNext) -> BoxResponseFuture {
        if self.layers.is_empty() {
            return handler(req);
        }

        // Build the chain from inside out
        let mut next = handler;

        for layer in self.layers.iter().rev() {
            let layer = layer.clone_box();
            let current_next = next;
            next = Arc::new(move |req: Request| layer.call(req, current_next.clone()));
        }

        next(req)
    }

    /// Wrap `handler` once, so the chain is not rebuilt per request
    pub(crate) fn wrap(self, handler: BoxedNext) -> BoxedNext {
        if self.layers.is_empty() {
            return handler;
        }
        let stack = Arc::new(self);
        Arc::new(move |req: Request| stack.execute(req, handler.clone()))
    }
}
