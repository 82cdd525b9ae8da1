use http::Method;
use smallvec::SmallVec;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::error::RouterError;
use super::meta::{ParameterLocation, ParameterMeta, RouteMeta};
use super::radix::{canonical_template, parse_template, RadixRouter, Segment};

/// Maximum number of path/query parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Raw `(name, value)` parameter storage for the hot path.
///
/// Names are shared with the route tree; values are per-request strings.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Result of successfully matching a request path to a route
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// The matched route metadata
    pub route: Arc<RouteMeta>,
    /// Raw path segments bound to template parameters (e.g. `{id}` → `"123"`)
    pub path_params: ParamVec,
    /// Name of the handler that should process this request
    pub handler_name: String,
    /// Raw query string parameters (populated by the server)
    pub query_params: ParamVec,
}

impl RouteMatch {
    /// Get a raw path parameter by name
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a raw query parameter by name
    ///
    /// Uses "last write wins" semantics: with `?limit=10&limit=20` this returns `"20"`.
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Ordered route table backed by a radix tree.
///
/// Routes are matched segment by segment; literal segments beat parameter
/// segments at the same depth, otherwise registration order decides.
#[derive(Clone, Default)]
pub struct Router {
    radix_router: RadixRouter,
    routes: Vec<Arc<RouteMeta>>,
    registered: HashSet<(Method, String)>,
}

impl Router {
    /// Create an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a router from a list of routes, registering them in order.
    ///
    /// # Errors
    ///
    /// Fails on the first route [`register`](Self::register) rejects.
    pub fn from_routes(routes: impl IntoIterator<Item = RouteMeta>) -> Result<Self, RouterError> {
        let mut router = Self::new();
        for route in routes {
            router.register(route)?;
        }
        info!(
            routes_count = router.routes.len(),
            routing_algorithm = "radix_tree",
            "Routing table loaded"
        );
        Ok(router)
    }

    /// Add a route to the table.
    ///
    /// Path segments without an explicit parameter declaration are declared
    /// here: `{id:int}` implies an integer, a bare `{name}` a string.
    ///
    /// # Errors
    ///
    /// - [`RouterError::InvalidTemplate`] if the template does not parse
    /// - [`RouterError::UnknownPathParam`] if a declared path parameter has no segment
    /// - [`RouterError::DuplicateRoute`] if the method and template are already registered
    pub fn register(&mut self, mut route: RouteMeta) -> Result<Arc<RouteMeta>, RouterError> {
        let segments = parse_template(&route.path_pattern)?;
        let canonical = canonical_template(&segments);

        for declared in route.path_params() {
            let present = segments.iter().any(
                |s| matches!(s, Segment::Param { name, .. } if *name == declared.name),
            );
            if !present {
                return Err(RouterError::UnknownPathParam {
                    template: route.path_pattern.clone(),
                    name: declared.name.clone(),
                });
            }
        }

        let key = (route.method.clone(), canonical.clone());
        if self.registered.contains(&key) {
            warn!(method = %route.method, template = %canonical, "Duplicate route rejected");
            return Err(RouterError::DuplicateRoute {
                method: route.method,
                template: canonical,
            });
        }

        for segment in &segments {
            if let Segment::Param { name, convertor } = segment {
                if route.path_param_meta(name).is_none() {
                    route.parameters.push(ParameterMeta {
                        name: name.clone(),
                        location: ParameterLocation::Path,
                        param_type: convertor.implied_type(),
                        required: true,
                        default: None,
                    });
                }
            }
        }

        let route = Arc::new(route);
        self.radix_router.insert(&segments, Arc::clone(&route));
        self.routes.push(Arc::clone(&route));
        self.registered.insert(key);

        debug!(
            method = %route.method,
            template = %canonical,
            handler_name = %route.handler_name,
            "Route registered"
        );
        Ok(route)
    }

    /// Registered routes, in registration order.
    #[must_use]
    pub fn routes(&self) -> &[Arc<RouteMeta>] {
        &self.routes
    }

    /// One line per route, e.g. `GET /persons/{id} -> persons`.
    #[must_use]
    pub fn dump_routes(&self) -> Vec<String> {
        self.routes
            .iter()
            .map(|r| format!("{} {} -> {}", r.method, r.path_pattern, r.handler_name))
            .collect()
    }

    /// Match an HTTP request to a route.
    ///
    /// The path must not include the query string. Segments are percent-decoded
    /// before matching, and empty segments are ignored.
    ///
    /// # Returns
    ///
    /// * `Some(RouteMatch)` - If a matching route is found
    /// * `None` - If no route matches (results in 404)
    #[must_use]
    pub fn route(&self, method: Method, path: &str) -> Option<RouteMatch> {
        let decoded: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                urlencoding::decode(s)
                    .map(|c| c.into_owned())
                    .unwrap_or_else(|_| s.to_string())
            })
            .collect();
        let segments: Vec<&str> = decoded.iter().map(String::as_str).collect();

        let match_start = std::time::Instant::now();
        let result = self.radix_router.route(&method, &segments);
        let duration_us = match_start.elapsed().as_micros();

        match result {
            Some((route, path_params)) => {
                debug!(
                    method = %method,
                    path = %path,
                    handler_name = %route.handler_name,
                    route_pattern = %route.path_pattern,
                    path_params = ?path_params,
                    duration_us,
                    "Route matched"
                );
                let handler_name = route.handler_name.clone();
                Some(RouteMatch {
                    route,
                    path_params,
                    handler_name,
                    query_params: ParamVec::new(),
                })
            }
            None => {
                warn!(method = %method, path = %path, duration_us, "No route matched");
                None
            }
        }
    }
}
