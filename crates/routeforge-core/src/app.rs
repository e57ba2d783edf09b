//! A built API, ready to serve

use crate::export::ApiExport;
use crate::middleware::DEFAULT_BODY_LIMIT;
use crate::router::{RouteInfo, Router};
use crate::server::{ServeError, Server};
use std::future::Future;
use std::sync::Arc;
use tracing::warn;

/// Result of [`Api::build`](crate::Api::build): every endpoint is validated
/// and registered.
pub struct App {
    router: Arc<Router>,
    export: ApiExport,
    body_limit: usize,
}

impl App {
    pub(crate) fn new(router: Router, export: ApiExport) -> Self {
        Self {
            router: Arc::new(router),
            export,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Registered (method, path) pairs, in registration order
    pub fn routes(&self) -> &[RouteInfo] {
        self.router.routes()
    }

    /// The API tree as declared
    pub fn export(&self) -> &ApiExport {
        &self.export
    }

    /// Largest accepted request body, in bytes (1 MiB by default)
    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    pub fn body_limit(&self) -> usize {
        self.body_limit
    }

    /// Serve on `addr` until Ctrl+C
    ///
    /// ```rust,ignore
    /// api.build().await?.run("127.0.0.1:8080").await
    /// ```
    pub async fn run(self, addr: &str) -> Result<(), ServeError> {
        self.run_until(addr, async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = %err, "failed to listen for Ctrl+C, serving until killed");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Serve on `addr` until `shutdown` resolves
    pub async fn run_until(
        self,
        addr: &str,
        shutdown: impl Future<Output = ()> + Send,
    ) -> Result<(), ServeError> {
        Server::new(self.router, self.body_limit)
            .run_until(addr, shutdown)
            .await
    }

    #[cfg(any(test, feature = "test-utils"))]
    pub(crate) fn router(&self) -> Arc<Router> {
        self.router.clone()
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("name", &self.export.name)
            .field("routes", &self.router.routes().len())
            .field("body_limit", &self.body_limit)
            .finish()
    }
}
