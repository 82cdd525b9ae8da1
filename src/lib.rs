//! # schemaroute
//!
//! **schemaroute** is a schema-validated HTTP request router on the `may` coroutine runtime.
//! Routes are declared in code with typed path/query parameters and body schemas; every
//! request is matched, its arguments coerced and validated, and only then handed to a handler.
//!
//! ## Architecture
//!
//! - **[`schema`]** - Declarative body schemas (fields, types, defaults, constraints)
//! - **[`router`]** - Radix-tree path matching with literal-over-parameter precedence
//! - **[`validator`]** - Path/query coercion and batch body validation
//! - **[`dispatcher`]** - Coroutine-based handler dispatch with panic recovery
//! - **[`typed`]** - Handlers over deserialized argument structs
//! - **[`server`]** - HTTP service and server on `may_minihttp`
//! - **[`handlers`]** - The demo route tables served by the binary
//! - **[`runtime_config`]**, **[`logging`]**, **[`ids`]** - Ambient runtime pieces
//!
//! ## Request Lifecycle
//!
//! ```text
//! parse ──> /health? ──> route ──> bind path/query ──> decode body ──> dispatch ──> write
//!               │           │              │                  │             │
//!              200         404            400                422        500 on panic
//! ```
//!
//! Path and query problems are reported together as one `400`; body problems are
//! reported together as one `422`. The body is not inspected when path or query
//! arguments are already invalid.
//!
//! ## Quick Start
//!
//! ```rust
//! use schemaroute::dispatcher::{Dispatcher, HandlerResponse};
//! use schemaroute::router::{ParamType, RouteMeta, Router};
//! use schemaroute::server::{AppService, ParsedRequest};
//!
//! let mut router = Router::new();
//! router
//!     .register(RouteMeta::get("/persons/{id}", "persons").path_param("id", ParamType::Integer))
//!     .unwrap();
//!
//! let mut dispatcher = Dispatcher::new();
//! dispatcher
//!     .register_fn("persons", |req| {
//!         let id: i64 = req.path_param("id").unwrap_or_default();
//!         HandlerResponse::ok(&serde_json::json!({ "id": id }))
//!     })
//!     .unwrap();
//!
//! let service = AppService::new(router, dispatcher);
//! let res = service.handle(&ParsedRequest::new("GET", "/persons/7", None));
//! assert_eq!(res.status, 200);
//! assert_eq!(res.body, serde_json::json!({ "id": 7 }));
//!
//! let res = service.handle(&ParsedRequest::new("GET", "/persons/seven", None));
//! assert_eq!(res.status, 400);
//! ```
//!
//! ## Binary
//!
//! ```bash
//! schemaroute serve --variant full --addr 127.0.0.1:8000
//! schemaroute routes --variant basics --format json
//! ```

pub mod cli;
pub mod dispatcher;
pub mod handlers;
pub mod ids;
pub mod logging;
pub mod router;
pub mod runtime_config;
pub mod schema;
pub mod server;
pub mod typed;
pub mod validator;

pub use dispatcher::{Dispatcher, HandlerRequest, HandlerResponse};
pub use router::{ParamType, RouteMeta, Router};
pub use schema::{FieldSpec, FieldType, Schema};
pub use server::{AppService, HttpServer, ParsedRequest};
pub use validator::{RequestError, ValidationIssue};
