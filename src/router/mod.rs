//! # Router Module
//!
//! Path matching and route resolution. Routes are declared as [`RouteMeta`]
//! values (method, path template, handler name, typed parameters, body
//! schemas) and registered into a [`Router`].
//!
//! ## Path templates
//!
//! - `/user/admin`: literal segments match exactly
//! - `/user/{name}`: a named segment binds any single segment as a string
//! - `/user/{id:int}`: a typed segment only matches digits and binds an integer
//!
//! ## Matching
//!
//! The router stores routes in a radix tree. At each segment literal children
//! are tried before parameter children, so `/user/admin` always wins over
//! `/user/{name}`. Parameter children are tried in registration order.
//!
//! ```rust
//! use http::Method;
//! use schemaroute::router::{ParamType, RouteMeta, Router};
//!
//! let mut router = Router::new();
//! router.register(RouteMeta::get("/user/{name}", "page")).unwrap();
//! router.register(RouteMeta::get("/user/admin", "admin")).unwrap();
//! router
//!     .register(RouteMeta::get("/persons/{id}", "persons").path_param("id", ParamType::Integer))
//!     .unwrap();
//!
//! let m = router.route(Method::GET, "/user/admin").unwrap();
//! assert_eq!(m.handler_name, "admin");
//! let m = router.route(Method::GET, "/persons/7").unwrap();
//! assert_eq!(m.get_path_param("id"), Some("7"));
//! ```

mod core;
mod error;
mod meta;
mod radix;
#[cfg(test)]
mod tests;

pub use self::core::{ParamVec, RouteMatch, Router, MAX_INLINE_PARAMS};
pub use error::RouterError;
pub use meta::{BodyParam, ParamType, ParameterLocation, ParameterMeta, RouteMeta};
pub use radix::Convertor;
