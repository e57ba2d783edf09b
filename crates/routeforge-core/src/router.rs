//! Router implementation using radix tree (matchit)
//!
//! Paths use `{param}` syntax:
//!
//! - `/pets` - Static path
//! - `/pets/{id}` - Single parameter
//! - `/owners/{owner_id}/pets/{pet_id}` - Multiple parameters
//!
//! Registering the same method twice on one path, or two paths that matchit
//! cannot tell apart, is reported as a [`RouteConflictError`].

use crate::handler::BoxedHandler;
use http::Method;
use matchit::Router as MatchitRouter;
use std::collections::HashMap;
use std::fmt;

/// A registered (method, path) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    pub method: Method,
    /// Path pattern as declared (e.g. `/v1/pets/{id}`)
    pub path: String,
    /// Name of the endpoint serving it
    pub name: String,
}

/// Error returned when a route conflict is detected
#[derive(Debug, Clone)]
pub struct RouteConflictError {
    /// The path that was being registered
    pub new_path: String,
    /// The HTTP method being registered
    pub method: Method,
    /// The already registered path it collides with
    pub existing_path: String,
    /// Detailed error message
    pub details: String,
}

impl fmt::Display for RouteConflictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} conflicts with {}: {}",
            self.method, self.new_path, self.existing_path, self.details
        )
    }
}

impl std::error::Error for RouteConflictError {}

/// HTTP method router for a single path
#[derive(Clone, Default)]
pub(crate) struct MethodRouter {
    handlers: HashMap<Method, BoxedHandler>,
}

impl MethodRouter {
    pub(crate) fn get_handler(&self, method: &Method) -> Option<&BoxedHandler> {
        self.handlers.get(method)
    }

    /// Allowed methods for a 405 response, sorted for a stable `Allow` header
    pub(crate) fn allowed_methods(&self) -> Vec<Method> {
        let mut methods: Vec<Method> = self.handlers.keys().cloned().collect();
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        methods
    }
}

/// Path router
pub struct Router {
    inner: MatchitRouter<usize>,
    method_routers: Vec<MethodRouter>,
    /// matchit path -> index into `method_routers`
    slots: HashMap<String, usize>,
    routes: Vec<RouteInfo>,
}

impl Router {
    /// Create a new router
    pub fn new() -> Self {
        Self {
            inner: MatchitRouter::new(),
            method_routers: Vec::new(),
            slots: HashMap::new(),
            routes: Vec::new(),
        }
    }

    /// Register `handler` for `method` on `path`
    pub(crate) fn insert(
        &mut self,
        method: Method,
        path: &str,
        name: &str,
        handler: BoxedHandler,
    ) -> Result<(), RouteConflictError> {
        let matchit_path = convert_path_params(path);

        let slot = match self.slots.get(&matchit_path) {
            Some(&slot) => slot,
            None => {
                let slot = self.method_routers.len();
                self.inner
                    .insert(matchit_path.clone(), slot)
                    .map_err(|err| RouteConflictError {
                        new_path: path.to_string(),
                        method: method.clone(),
                        existing_path: self
                            .find_conflicting_route(&matchit_path)
                            .unwrap_or("<unknown>")
                            .to_string(),
                        details: err.to_string(),
                    })?;
                self.method_routers.push(MethodRouter::default());
                self.slots.insert(matchit_path.clone(), slot);
                slot
            }
        };

        let method_router = &mut self.method_routers[slot];
        if method_router.handlers.contains_key(&method) {
            return Err(RouteConflictError {
                new_path: path.to_string(),
                method,
                existing_path: path.to_string(),
                details: "handler already registered for this method".to_string(),
            });
        }
        method_router.handlers.insert(method.clone(), handler);

        tracing::debug!(method = %method, path = %path, endpoint = %name, "route registered");
        self.routes.push(RouteInfo {
            method,
            path: path.to_string(),
            name: name.to_string(),
        });
        Ok(())
    }

    // Same structure with different parameter names is a conflict in matchit
    fn find_conflicting_route(&self, matchit_path: &str) -> Option<&str> {
        let normalized_new = normalize_path_for_comparison(matchit_path);
        self.routes
            .iter()
            .find(|info| {
                normalize_path_for_comparison(&convert_path_params(&info.path)) == normalized_new
            })
            .map(|info| info.path.as_str())
    }

    /// Match a request and return the handler + params
    pub(crate) fn match_route(&self, path: &str, method: &Method) -> RouteMatch<'_> {
        match self.inner.at(path) {
            Ok(matched) => {
                let method_router = &self.method_routers[*matched.value];

                if let Some(handler) = method_router.get_handler(method) {
                    let params: HashMap<String, String> = matched
                        .params
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect();

                    RouteMatch::Found { handler, params }
                } else {
                    RouteMatch::MethodNotAllowed {
                        allowed: method_router.allowed_methods(),
                    }
                }
            }
            Err(_) => RouteMatch::NotFound,
        }
    }

    /// Registered routes, in registration order
    pub fn routes(&self) -> &[RouteInfo] {
        &self.routes
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of route matching
pub(crate) enum RouteMatch<'a> {
    Found {
        handler: &'a BoxedHandler,
        params: HashMap<String, String>,
    },
    NotFound,
    MethodNotAllowed {
        allowed: Vec<Method>,
    },
}

/// Convert {param} style to :param for matchit
fn convert_path_params(path: &str) -> String {
    let mut result = String::with_capacity(path.len());

    for ch in path.chars() {
        match ch {
            '{' => result.push(':'),
            '}' => {}
            _ => result.push(ch),
        }
    }

    result
}

/// Replace parameter names with a placeholder
fn normalize_path_for_comparison(path: &str) -> String {
    let mut result = String::with_capacity(path.len());
    let mut in_param = false;

    for ch in path.chars() {
        match ch {
            ':' => {
                in_param = true;
                result.push_str(":_");
            }
            '/' => {
                in_param = false;
                result.push('/');
            }
            _ if in_param => {}
            _ => result.push(ch),
        }
    }

    result
}

/// Join path pieces into one normalized path.
///
/// Empty segments are dropped, so `["/api/", "/v1", "/", "/pets"]` becomes
/// `/api/v1/pets`. No pieces (or only slashes) gives `/`.
pub(crate) fn join_paths<'a>(pieces: impl IntoIterator<Item = &'a str>) -> String {
    let mut result = String::new();
    for segment in pieces
        .into_iter()
        .flat_map(|piece| piece.split('/'))
        .filter(|segment| !segment.is_empty())
    {
        result.push('/');
        result.push_str(segment);
    }

    if result.is_empty() {
        result.push('/');
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::BoxResponseFuture;
    use crate::response::IntoResponse;
    use std::sync::Arc;

    fn handler(body: &'static str) -> BoxedHandler {
        Arc::new(move |_req| Box::pin(async move { body.into_response() }) as BoxResponseFuture)
    }

    #[test]
    fn test_convert_path_params() {
        assert_eq!(convert_path_params("/users/{id}"), "/users/:id");
        assert_eq!(
            convert_path_params("/users/{user_id}/posts/{post_id}"),
            "/users/:user_id/posts/:post_id"
        );
        assert_eq!(convert_path_params("/static/path"), "/static/path");
    }

    #[test]
    fn test_normalize_path_for_comparison() {
        assert_eq!(normalize_path_for_comparison("/users/:id"), "/users/:_");
        assert_eq!(
            normalize_path_for_comparison("/users/:id/posts/:post_id"),
            "/users/:_/posts/:_"
        );
    }

    #[test]
    fn test_join_paths() {
        assert_eq!(join_paths(["/api/", "/v1", "/", "/pets"]), "/api/v1/pets");
        assert_eq!(join_paths(["/", "/"]), "/");
        assert_eq!(join_paths(["/", "v2", "{id}"]), "/v2/{id}");
        assert_eq!(join_paths(std::iter::empty()), "/");
    }

    #[test]
    fn matches_methods_and_params() {
        let mut router = Router::new();
        router.insert(Method::GET, "/pets", "list", handler("list")).unwrap();
        router.insert(Method::POST, "/pets", "create", handler("create")).unwrap();
        router.insert(Method::GET, "/pets/{id}", "show", handler("show")).unwrap();

        match router.match_route("/pets/7", &Method::GET) {
            RouteMatch::Found { params, .. } => assert_eq!(params["id"], "7"),
            _ => panic!("expected a match"),
        }
        match router.match_route("/pets", &Method::DELETE) {
            RouteMatch::MethodNotAllowed { allowed } => {
                assert_eq!(allowed, vec![Method::GET, Method::POST])
            }
            _ => panic!("expected 405"),
        }
        assert!(matches!(router.match_route("/owners", &Method::GET), RouteMatch::NotFound));
        assert_eq!(router.routes().len(), 3);
    }

    #[test]
    fn duplicate_method_is_a_conflict() {
        let mut router = Router::new();
        router.insert(Method::GET, "/pets", "a", handler("a")).unwrap();
        let err = router.insert(Method::GET, "/pets", "b", handler("b")).unwrap_err();
        assert_eq!(err.method, Method::GET);
        assert_eq!(err.existing_path, "/pets");
    }

    #[test]
    fn differently_named_params_conflict() {
        let mut router = Router::new();
        router.insert(Method::GET, "/pets/{id}", "a", handler("a")).unwrap();
        let err = router
            .insert(Method::GET, "/pets/{pet_id}", "b", handler("b"))
            .unwrap_err();
        assert_eq!(err.existing_path, "/pets/{id}");
        assert!(err.to_string().contains("/pets/{pet_id}"));
    }
}
