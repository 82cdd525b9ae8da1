//! # Demo Handlers
//!
//! The demo apps served by the binary: body models ([`models`]), GET page
//! handlers ([`pages`]), typed body handlers ([`bodies`]) and the per-variant
//! route tables that wire them together ([`registry`]).

pub mod bodies;
pub mod models;
pub mod pages;
pub mod registry;

pub use registry::{build, register_handlers, routes, Variant};
