//! # Dispatcher Module
//!
//! Hands validated requests to handler coroutines and collects their responses.
//!
//! ## Architecture
//!
//! Handlers run on the `may` coroutine runtime:
//!
//! - Each registered handler gets its own coroutine, fed by an MPSC channel
//! - [`Dispatcher::dispatch`] sends a [`HandlerRequest`] with a one-shot reply
//!   channel and blocks the calling coroutine until the handler answers
//! - A panicking handler is answered with a `500` and its coroutine keeps running
//!
//! ## Handler Registration
//!
//! ```rust
//! use schemaroute::dispatcher::{Dispatcher, HandlerRequest, HandlerResponse};
//!
//! let mut dispatcher = Dispatcher::new();
//! dispatcher
//!     .register_fn("persons", |req: HandlerRequest| {
//!         let id: i64 = req.path_param("id").unwrap_or_default();
//!         HandlerResponse::ok(&serde_json::json!({ "message": format!("person {id}") }))
//!     })
//!     .unwrap();
//! assert!(dispatcher.has_handler("persons"));
//! ```
//!
//! Typed handlers (see [`crate::typed`]) are registered through the same
//! mechanism with [`Dispatcher::register_typed`].

mod core;

pub use self::core::{
    Dispatcher, Envelope, HandlerRequest, HandlerResponse, HandlerSender, HeaderVec,
    DEFAULT_HANDLER_STACK_SIZE, MAX_INLINE_HEADERS,
};
