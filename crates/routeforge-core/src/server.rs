//! Accept loop and per-request routing
//!
//! Each connection is served by hyper's HTTP/1 implementation on its own task.
//! Bodies are buffered up to the app's limit before routing.

use crate::error::ApiError;
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::router::{RouteMatch, Router};
use bytes::Bytes;
use http::{header, request::Parts, HeaderValue, StatusCode};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Error returned by [`App::run`](crate::App::run)
pub type ServeError = Box<dyn std::error::Error + Send + Sync>;

/// Listener state shared by every accepted connection
pub(crate) struct Server {
    router: Arc<Router>,
    body_limit: usize,
}

impl Server {
    pub fn new(router: Arc<Router>, body_limit: usize) -> Self {
        Self { router, body_limit }
    }

    /// Serve until `shutdown` resolves
    pub async fn run_until(
        self,
        addr: &str,
        shutdown: impl Future<Output = ()> + Send,
    ) -> Result<(), ServeError> {
        let bound: SocketAddr = addr.parse()?;
        let listener = TcpListener::bind(bound).await?;

        info!(address = %bound, routes = self.router.routes().len(), "routeforge server listening");

        tokio::pin!(shutdown);
        loop {
            let (stream, peer) = tokio::select! {
                accepted = listener.accept() => accepted?,
                _ = &mut shutdown => {
                    info!("shutdown signal received, no longer accepting connections");
                    return Ok(());
                }
            };
            let shared = Arc::clone(&self.router);
            let limit = self.body_limit;
            let service = service_fn(move |incoming: hyper::Request<Incoming>| {
                let router = Arc::clone(&shared);
                async move { Ok::<_, Infallible>(handle_request(&router, incoming, limit).await) }
            });

            tokio::spawn(async move {
                let served = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await;
                if let Err(err) = served {
                    error!(peer = %peer, error = %err, "connection closed with an error");
                }
            });
        }
    }
}

/// Buffer the body and route a hyper request
async fn handle_request(
    router: &Router,
    incoming: hyper::Request<Incoming>,
    body_limit: usize,
) -> Response {
    let (parts, body) = incoming.into_parts();

    match Limited::new(body, body_limit).collect().await {
        Ok(collected) => route_request(router, parts, collected.to_bytes()).await,
        Err(err) => {
            warn!(error = %err, "failed to read request body");
            let error = if err.downcast_ref::<LengthLimitError>().is_some() {
                ApiError::payload_too_large(body_limit)
            } else {
                ApiError::bad_request("Failed to read request body")
            };
            let response = error.into_response();
            record_outcome(&parts.method, parts.uri.path(), response.status(), Instant::now());
            response
        }
    }
}

/// Route a buffered request to its endpoint
pub(crate) async fn route_request(router: &Router, parts: Parts, body: Bytes) -> Response {
    let started = Instant::now();
    let method = parts.method.clone();
    let path = parts.uri.path().to_owned();

    let response = match router.match_route(&path, &method) {
        RouteMatch::Found { handler, params } => {
            let endpoint = Arc::clone(handler);
            endpoint(Request::new(parts, body, params)).await
        }
        RouteMatch::NotFound => {
            ApiError::not_found(format!("No route found for {method} {path}")).into_response()
        }
        RouteMatch::MethodNotAllowed { allowed } => method_not_allowed(&method, &path, &allowed),
    };

    record_outcome(&method, &path, response.status(), started);
    response
}

fn method_not_allowed(method: &http::Method, path: &str, allowed: &[http::Method]) -> Response {
    let mut response = ApiError::new(
        StatusCode::METHOD_NOT_ALLOWED,
        "method_not_allowed",
        format!("Method {method} not allowed for {path}"),
    )
    .into_response();

    let listed = allowed
        .iter()
        .map(http::Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if let Ok(value) = HeaderValue::from_str(&listed) {
        response.headers_mut().insert(header::ALLOW, value);
    }
    response
}

fn record_outcome(method: &http::Method, path: &str, status: StatusCode, started: Instant) {
    let status = status.as_u16();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if status >= 500 {
        error!(%method, path, status, elapsed_ms, "request failed");
    } else {
        info!(%method, path, status, elapsed_ms, "request handled");
    }
}
