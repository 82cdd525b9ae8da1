//! Route tables of the demo apps and the handlers behind them.
//!
//! The demo apps overlap: `/items` takes required `page`/`limit` in one and
//! defaulted `id`/`qty` in another, `/user/...` is a name in one and a typed id
//! in another. Each [`Variant`] is therefore its own router and dispatcher;
//! tables are never merged.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

use super::bodies::{
    AddCatalogProduct, AddProduct, AddUser, EchoStudent, MakeOffer, OrderDetail, Pagination,
    Purchase, Transcript, UserById,
};
use super::models::{
    offer_schema, order_schema, product_schema, profile_schema, student_schema,
    undergraduate_schema, user_schema,
};
use super::pages;
use crate::dispatcher::Dispatcher;
use crate::router::{ParamType, RouteMeta, Router};

/// Which demo route table to serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Every route, with the path/query/body examples
    #[default]
    Full,
    /// Path and query parameter basics
    Basics,
    /// Exercise app with typed `/user/{id:int}`
    Exercises,
}

impl Variant {
    pub const ALL: [Variant; 3] = [Variant::Full, Variant::Basics, Variant::Exercises];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Full => "full",
            Variant::Basics => "basics",
            Variant::Exercises => "exercises",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variant::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                anyhow::anyhow!("unknown route variant '{s}' (expected full, basics or exercises)")
            })
    }
}

fn static_pages() -> Vec<RouteMeta> {
    vec![
        RouteMeta::get("/", "index"),
        RouteMeta::get("/property", "property"),
        RouteMeta::get("/movies", "movies"),
    ]
}

fn path_pages() -> Vec<RouteMeta> {
    vec![
        RouteMeta::get("/person/{id}", "person"),
        RouteMeta::get("/persons/{id}", "persons").path_param("id", ParamType::Integer),
        RouteMeta::get("/profile/{username}", "profile").path_param("username", ParamType::String),
        // literal before template
        RouteMeta::get("/user/admin", "admin"),
        RouteMeta::get("/user/{name}", "page"),
    ]
}

fn products() -> RouteMeta {
    RouteMeta::get("/products", "products")
        .query_default("id", ParamType::String, 1)
        .query_default("price", ParamType::String, 0)
}

fn about() -> RouteMeta {
    RouteMeta::get("/about/{userid}/comments", "about")
        .path_param("userid", ParamType::Integer)
        .query("commentid", ParamType::Integer)
}

fn paged_items() -> RouteMeta {
    RouteMeta::get("/items", "items")
        .query("page", ParamType::Integer)
        .query("limit", ParamType::Integer)
}

fn students() -> RouteMeta {
    RouteMeta::post("/students", "student").body("student", student_schema())
}

fn undergraduate() -> RouteMeta {
    RouteMeta::post("/undergraduate", "transcript").body("undergraduate", undergraduate_schema())
}

fn orders() -> RouteMeta {
    RouteMeta::post("/orders/{order_id}", "order_detail")
        .path_param("order_id", ParamType::Integer)
        .query("customer", ParamType::String)
        .body("order", order_schema())
}

/// Route table of a variant, in registration order.
#[must_use]
pub fn routes(variant: Variant) -> Vec<RouteMeta> {
    let mut table = Vec::new();
    match variant {
        Variant::Full => {
            table.extend(static_pages());
            table.extend(path_pages());
            table.push(products());
            table.push(paged_items());
            table.push(about());
            table.push(students());
            table.push(undergraduate());
            table.push(orders());
            table.push(RouteMeta::post("/adduser", "adduser").body("profile", profile_schema()));
            table.push(
                RouteMeta::post("/addproduct/{product_id}", "addproduct")
                    .path_param("product_id", ParamType::Integer)
                    .query("category", ParamType::String)
                    .body("product", product_schema()),
            );
            table.push(
                RouteMeta::post("/purchase", "purchase")
                    .body("user", user_schema())
                    .body("product", product_schema()),
            );
            table.push(RouteMeta::post("/offer", "offer").body("offer", offer_schema()));
            table.push(
                RouteMeta::post("/addproduct/", "add_catalog_product")
                    .body("product", product_schema()),
            );
        }
        Variant::Basics => {
            table.extend(static_pages());
            table.extend(path_pages());
            table.push(products());
            table.push(
                RouteMeta::get("/items", "items")
                    .query_default("id", ParamType::Integer, 1)
                    .query_default("qty", ParamType::Integer, 0),
            );
            table.push(about());
        }
        Variant::Exercises => {
            table.push(RouteMeta::get("/user/{id:int}", "user"));
            table.push(paged_items());
            table.push(students());
            table.push(undergraduate());
            table.push(orders());
        }
    }
    table
}

/// Register the handlers a variant's routes refer to.
///
/// # Errors
///
/// If a handler coroutine cannot be spawned.
pub fn register_handlers(variant: Variant, dispatcher: &mut Dispatcher) -> std::io::Result<()> {
    let d = dispatcher;
    if variant != Variant::Exercises {
        d.register_fn("index", pages::index)?;
        d.register_fn("property", pages::property)?;
        d.register_fn("movies", pages::movies)?;
        d.register_fn("person", pages::person)?;
        d.register_fn("persons", pages::person)?;
        d.register_fn("profile", pages::profile)?;
        d.register_fn("admin", pages::admin)?;
        d.register_fn("page", pages::user_page)?;
        d.register_fn("products", pages::products)?;
        d.register_fn("about", pages::about)?;
    }

    match variant {
        Variant::Full => {
            d.register_typed("items", Pagination)?;
            d.register_typed("student", EchoStudent)?;
            d.register_typed("transcript", Transcript)?;
            d.register_typed("order_detail", OrderDetail)?;
            d.register_typed("adduser", AddUser)?;
            d.register_typed("addproduct", AddProduct)?;
            d.register_typed("purchase", Purchase)?;
            d.register_typed("offer", MakeOffer)?;
            d.register_typed("add_catalog_product", AddCatalogProduct)?;
        }
        Variant::Basics => {
            d.register_fn("items", pages::item_stock)?;
        }
        Variant::Exercises => {
            d.register_typed("user", UserById)?;
            d.register_typed("items", Pagination)?;
            d.register_typed("student", EchoStudent)?;
            d.register_typed("transcript", Transcript)?;
            d.register_typed("order_detail", OrderDetail)?;
        }
    }
    Ok(())
}

/// Build the router and dispatcher serving `variant`.
///
/// # Errors
///
/// If the route table is rejected by the router (duplicate or malformed
/// routes) or a handler coroutine cannot be spawned.
pub fn build(variant: Variant, handler_stack_size: usize) -> anyhow::Result<(Router, Dispatcher)> {
    let router = Router::from_routes(routes(variant))
        .with_context(|| format!("invalid route table for variant '{variant}'"))?;

    let mut dispatcher = Dispatcher::new();
    dispatcher.set_stack_size(handler_stack_size);
    register_handlers(variant, &mut dispatcher)
        .with_context(|| format!("failed to start handlers for variant '{variant}'"))?;

    info!(
        variant = %variant,
        routes = router.routes().len(),
        handlers = dispatcher.handlers.len(),
        "Route table ready"
    );
    Ok((router, dispatcher))
}
