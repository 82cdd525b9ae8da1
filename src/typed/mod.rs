//! # Typed Module
//!
//! Type-safe handlers. Instead of pulling values out of a raw
//! [`HandlerRequest`](crate::dispatcher::HandlerRequest), a [`Handler`] declares a
//! request struct built with `TryFrom` and a response type serialized with serde.
//!
//! ## Usage
//!
//! ```rust
//! use schemaroute::dispatcher::HandlerRequest;
//! use schemaroute::typed::{Handler, TypedHandlerRequest};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Deserialize)]
//! struct PersonArgs {
//!     id: i64,
//! }
//!
//! impl TryFrom<HandlerRequest> for PersonArgs {
//!     type Error = anyhow::Error;
//!     fn try_from(req: HandlerRequest) -> anyhow::Result<Self> {
//!         req.args()
//!     }
//! }
//!
//! #[derive(Serialize)]
//! struct Message {
//!     message: String,
//! }
//!
//! struct Persons;
//!
//! impl Handler for Persons {
//!     type Request = PersonArgs;
//!     type Response = Message;
//!     fn handle(&self, req: TypedHandlerRequest<PersonArgs>) -> Message {
//!         Message { message: format!("person {}", req.data.id) }
//!     }
//! }
//! ```
//!
//! A handler whose request fails to convert is answered with `400 Invalid
//! request data`; the handler itself never runs.

mod core;

pub use self::core::{invoke_typed, Handler, TypedHandlerFor, TypedHandlerRequest};
