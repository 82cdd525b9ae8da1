//! # Server Module
//!
//! HTTP surface on top of `may_minihttp`. [`AppService`] parses each request,
//! answers `GET /health`, routes it, binds and validates its arguments and
//! dispatches it to a handler coroutine. [`HttpServer`] runs the service.

pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{resolve_addr, HttpServer, ServerHandle, MAX_HEADERS};
pub use request::{parse_query_params, parse_request, ParsedRequest};
pub use response::write_handler_response;
pub use service::{health_response, AppService};
