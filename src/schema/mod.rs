//! # Schema Module
//!
//! Declarative body schemas: a schema is an ordered table of
//! `(field name, type, optional default, constraints)` rows that the
//! [`validator`](crate::validator) walks generically.
//!
//! ```rust
//! use schemaroute::schema::{FieldSpec, FieldType, Schema};
//!
//! let student = Schema::new("Student")
//!     .required("name", FieldType::String)
//!     .field(FieldSpec::new("score", FieldType::Integer).gt(0))
//!     .required("result", FieldType::Integer);
//! assert_eq!(student.fields.len(), 3);
//! ```
//!
//! Nested models are expressed with [`FieldType::Object`], collections with
//! [`FieldType::List`] and [`FieldType::Set`]. Fields that the handler fills in
//! (a pass/fail verdict, a total price) are declared [`FieldType::Computed`].

mod types;

pub use types::{Constraint, FieldSpec, FieldType, Schema};
