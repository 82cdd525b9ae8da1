//! # Validator Module
//!
//! Turns the raw strings and bytes of a matched request into typed values.
//!
//! - [`coerce_path`] and [`coerce_query`] convert single path/query values to
//!   their declared [`ParamType`](crate::router::ParamType)
//! - [`decode_body`] checks a JSON body against a [`Schema`](crate::schema::Schema),
//!   reporting every offending field at once
//! - [`bind_request`] does all of the above for a [`RouteMatch`](crate::router::RouteMatch)
//!
//! Failures are [`RequestError`]s carrying field-level [`ValidationIssue`]s.
//!
//! ```rust
//! use schemaroute::schema::{FieldSpec, FieldType, Schema};
//! use schemaroute::validator::decode_body;
//!
//! let schema = Schema::new("Student")
//!     .required("name", FieldType::String)
//!     .field(FieldSpec::new("score", FieldType::Integer).gt(0));
//!
//! let err = decode_body(&schema, br#"{"score": 0}"#).unwrap_err();
//! assert_eq!(err.status(), 422);
//! assert_eq!(err.issues().len(), 2);
//! ```

mod bind;
mod body;
mod error;
mod params;

pub use bind::{bind_request, BoundArgs, ValueVec};
pub use body::decode_body;
pub use error::{RequestError, ValidationIssue};
pub use params::{coerce_path, coerce_query};
