//! GET handlers of the demo apps.
//!
//! Most of them answer with a one-element JSON array holding a sentence.

use serde_json::{json, Value};

use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// A bound value as text: strings without quotes, everything else as JSON.
fn display(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn sentence(text: String) -> HandlerResponse {
    HandlerResponse::json(200, json!([text]))
}

pub fn index(_req: HandlerRequest) -> HandlerResponse {
    HandlerResponse::text(200, "Hello there!")
}

pub fn property(_req: HandlerRequest) -> HandlerResponse {
    HandlerResponse::text(200, "this is proeprty page")
}

pub fn movies(_req: HandlerRequest) -> HandlerResponse {
    HandlerResponse::json(200, json!({ "movie list": ["movie 1", "movie 2"] }))
}

/// `/person/{id}` and `/persons/{id}`; the latter binds `id` as an integer.
pub fn person(req: HandlerRequest) -> HandlerResponse {
    sentence(format!(
        "This is a personal page for person {}",
        display(req.get_path_param("id"))
    ))
}

pub fn profile(req: HandlerRequest) -> HandlerResponse {
    sentence(format!(
        "this is the profile page for user : {}",
        display(req.get_path_param("username"))
    ))
}

pub fn admin(_req: HandlerRequest) -> HandlerResponse {
    sentence("This is admin page".to_string())
}

pub fn user_page(req: HandlerRequest) -> HandlerResponse {
    sentence(format!(
        "this is a profile page for user {}",
        display(req.get_path_param("name"))
    ))
}

pub fn products(req: HandlerRequest) -> HandlerResponse {
    sentence(format!(
        "product with and id: {} and price :{}",
        display(req.get_query_param("id")),
        display(req.get_query_param("price"))
    ))
}

/// Stock lookup with defaulted `id` and `qty`.
pub fn item_stock(req: HandlerRequest) -> HandlerResponse {
    sentence(format!(
        "item with an id:{} and with quuantity of:{}",
        display(req.get_query_param("id")),
        display(req.get_query_param("qty"))
    ))
}

pub fn about(req: HandlerRequest) -> HandlerResponse {
    sentence(format!(
        "About page for the user with user id: {} and comment with: {}",
        display(req.get_path_param("userid")),
        display(req.get_query_param("commentid"))
    ))
}
