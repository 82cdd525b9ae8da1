//! Integration tests for the HTTP server
//!
//! Each test starts a real `HttpServer` on an ephemeral port and talks raw
//! HTTP/1.1 to it, so the may_minihttp request parsing and response writing
//! are exercised end to end.

use schemaroute::dispatcher::{Dispatcher, HandlerResponse};
use schemaroute::handlers::{build, Variant};
use schemaroute::router::{RouteMeta, Router};
use schemaroute::server::{AppService, HttpServer, ServerHandle};
use serde_json::json;
use std::net::SocketAddr;

mod common;
use common::http::{get, post_json, send_request};
use common::test_server::setup_may_runtime;

/// Test fixture with automatic teardown
///
/// Dropping the fixture stops the server even when an assertion fails.
struct DemoServer {
    handle: Option<ServerHandle>,
    addr: SocketAddr,
}

impl DemoServer {
    fn start(variant: Variant) -> Self {
        setup_may_runtime();
        let (router, dispatcher) = build(variant, 0x10000).unwrap();
        Self::start_service(AppService::new(router, dispatcher))
    }

    fn start_service(service: AppService) -> Self {
        setup_may_runtime();
        let handle = HttpServer(service)
            .start("127.0.0.1:0")
            .unwrap();
        handle.wait_ready().unwrap();
        let addr = handle.addr();
        Self {
            handle: Some(handle),
            addr,
        }
    }
}

impl Drop for DemoServer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.stop();
        }
    }
}

#[test]
fn test_ephemeral_port_is_resolved() {
    let server = DemoServer::start(Variant::Full);
    assert_ne!(server.addr.port(), 0);
}

#[test]
fn test_text_and_json_content_types() {
    let server = DemoServer::start(Variant::Full);

    let res = get(&server.addr, "/");
    assert_eq!(res.status, 200);
    assert!(res.content_type.starts_with("text/plain"), "{}", res.content_type);
    assert_eq!(res.body, "Hello there!");

    let res = get(&server.addr, "/persons/12");
    assert_eq!(res.status, 200);
    assert_eq!(res.content_type, "application/json");
    assert_eq!(res.json(), json!(["This is a personal page for person 12"]));
}

#[test]
fn test_health() {
    let server = DemoServer::start(Variant::Basics);
    let res = get(&server.addr, "/health");
    assert_eq!(res.status, 200);
    assert_eq!(res.json(), json!({ "status": "ok" }));
}

#[test]
fn test_error_statuses_on_the_wire() {
    let server = DemoServer::start(Variant::Full);

    let res = get(&server.addr, "/missing");
    assert_eq!(res.status, 404);
    assert_eq!(res.json()["error"], "Not Found");

    let res = get(&server.addr, "/items?page=x");
    assert_eq!(res.status, 400);
    assert_eq!(res.json()["details"].as_array().unwrap().len(), 2);

    let res = post_json(&server.addr, "/students", r#"{"name": "Ada", "score": 0, "result": 1}"#);
    assert_eq!(res.status, 422);
    assert_eq!(res.json()["details"][0]["kind"], "greater_than");
}

#[test]
fn test_post_body_round_trip() {
    let server = DemoServer::start(Variant::Full);
    let res = post_json(
        &server.addr,
        "/orders/5?customer=bob%20smith",
        r#"{"item_name": "pen", "price": 10, "quantity": 3}"#,
    );
    assert_eq!(res.status, 200);
    let body = res.json();
    assert_eq!(body["order_id"], 5);
    assert_eq!(body["customer"], "bob smith");
    assert_eq!(body["order"]["total_price"], 30);
}

#[test]
fn test_request_id_header_is_accepted() {
    let server = DemoServer::start(Variant::Exercises);
    let res = send_request(
        &server.addr,
        "GET /user/9 HTTP/1.1\r\nHost: localhost\r\nX-Request-Id: 01ARZ3NDEKTSV4RRFFQ69G5FAV\r\n\r\n",
    );
    assert_eq!(res.status, 200);
    assert_eq!(res.json(), json!({ "message": "user with id 9" }));
}

#[test]
fn test_sequential_requests_on_one_server() {
    let server = DemoServer::start(Variant::Full);
    for n in 0..20 {
        let res = get(&server.addr, &format!("/about/{n}/comments?commentid={}", n * 2));
        assert_eq!(res.status, 200);
        assert_eq!(
            res.json(),
            json!([format!(
                "About page for the user with user id: {n} and comment with: {}",
                n * 2
            )])
        );
    }
}

#[test]
fn test_handler_headers_reach_the_wire() {
    setup_may_runtime();
    let router = Router::from_routes([
        RouteMeta::get("/quoted", "quoted"),
        RouteMeta::get("/plain", "plain"),
    ])
    .unwrap();
    let mut dispatcher = Dispatcher::new();
    dispatcher
        .register_fn("quoted", |_req| {
            let mut res = HandlerResponse::json(200, json!("quoted"));
            res.set_header("x-custom", "yes".to_string());
            res
        })
        .unwrap();
    dispatcher
        .register_fn("plain", |_req| {
            let mut res = HandlerResponse::text(201, "made");
            res.set_header("cache-control", "no-store".to_string());
            res
        })
        .unwrap();
    let server = DemoServer::start_service(AppService::new(router, dispatcher));

    let res = get(&server.addr, "/quoted");
    assert_eq!(res.status, 200);
    assert_eq!(res.content_type, "application/json");
    assert_eq!(res.header("x-custom"), Some("yes"));
    assert_eq!(res.body, r#""quoted""#);
    assert_eq!(res.json(), json!("quoted"));

    let res = get(&server.addr, "/plain");
    assert_eq!(res.status, 201);
    assert!(res.content_type.starts_with("text/plain"), "{}", res.content_type);
    assert_eq!(res.header("cache-control"), Some("no-store"));
    assert_eq!(res.body, "made");
}
