use http::Method;
use schemaroute::router::{ParamType, ParamVec, RouteMeta, Router};
use schemaroute::schema::{Constraint, FieldSpec, FieldType, Schema};
use schemaroute::validator::{bind_request, coerce_path, coerce_query, decode_body, RequestError};
use serde_json::{json, Value};
use std::sync::Arc;

fn query(pairs: &[(&str, &str)]) -> ParamVec {
    pairs
        .iter()
        .map(|(k, v)| (Arc::from(*k), (*v).to_string()))
        .collect()
}

fn kinds(err: &RequestError) -> Vec<&str> {
    err.issues().iter().map(|i| i.kind.as_str()).collect()
}

fn tagged_item() -> Schema {
    Schema::new("Item")
        .required("title", FieldType::String)
        .field(
            FieldSpec::new("rating", FieldType::Number)
                .optional()
                .ge(0)
                .constraint(Constraint::Le(5.0)),
        )
        .field(FieldSpec::new("active", FieldType::Boolean).default_value(true))
        .field(
            FieldSpec::new("labels", FieldType::set(FieldType::String))
                .constraint(Constraint::MaxLength(3))
                .default_value(json!([])),
        )
}

#[test]
fn test_coerce_path_types() {
    assert_eq!(coerce_path("id", "42", ParamType::Integer).unwrap(), json!(42));
    assert_eq!(coerce_path("id", "+7", ParamType::Integer).unwrap(), json!(7));
    assert_eq!(coerce_path("id", "abc", ParamType::String).unwrap(), json!("abc"));
    assert_eq!(coerce_path("x", "2.5", ParamType::Number).unwrap(), json!(2.5));
    assert_eq!(coerce_path("on", "Yes", ParamType::Boolean).unwrap(), json!(true));

    let err = coerce_path("id", "4.2", ParamType::Integer).unwrap_err();
    assert_eq!(err.status(), 400);
    assert_eq!(err.issues()[0].location, "path.id");
    assert_eq!(kinds(&err), vec!["int_parsing"]);

    let err = coerce_path("x", "NaN", ParamType::Number).unwrap_err();
    assert_eq!(kinds(&err), vec!["float_parsing"]);
}

#[test]
fn test_coerce_query_defaults_and_missing() {
    let raw = query(&[("page", "3")]);
    assert_eq!(coerce_query("page", ParamType::Integer, None, &raw).unwrap(), json!(3));

    let fallback = json!(10);
    assert_eq!(
        coerce_query("limit", ParamType::Integer, Some(&fallback), &raw).unwrap(),
        json!(10)
    );

    let err = coerce_query("limit", ParamType::Integer, None, &raw).unwrap_err();
    assert_eq!(err.issues()[0].location, "query.limit");
    assert_eq!(kinds(&err), vec!["missing"]);
}

#[test]
fn test_coerce_query_present_value_is_converted_even_with_default() {
    let raw = query(&[("qty", "many")]);
    let fallback = json!(0);
    let err = coerce_query("qty", ParamType::Integer, Some(&fallback), &raw).unwrap_err();
    assert_eq!(kinds(&err), vec!["int_parsing"]);
}

#[test]
fn test_decode_body_applies_defaults_and_lenient_coercion() {
    let decoded = decode_body(
        &tagged_item(),
        br#"{"title": "Lamp", "rating": "4.5", "labels": ["a", "b", "a"], "extra": 1}"#,
    )
    .unwrap();
    assert_eq!(
        decoded,
        json!({ "title": "Lamp", "rating": 4.5, "active": true, "labels": ["a", "b"] })
    );
}

#[test]
fn test_decode_body_collects_constraint_violations() {
    let err = decode_body(
        &tagged_item(),
        br#"{"title": 5, "rating": 9, "active": "maybe", "labels": ["a", "b", "c", "d"]}"#,
    )
    .unwrap_err();
    assert_eq!(err.status(), 422);
    assert_eq!(
        kinds(&err),
        vec!["string_type", "less_than_equal", "bool_parsing", "too_long"]
    );
}

#[test]
fn test_decode_body_rejects_non_objects() {
    let err = decode_body(&tagged_item(), b"[1, 2]").unwrap_err();
    assert_eq!(kinds(&err), vec!["model_type"]);
    assert_eq!(err.issues()[0].location, "body");
}

#[test]
fn test_nested_object_in_list_reports_index() {
    let schema = Schema::new("Cart").required(
        "items",
        FieldType::list(FieldType::object(tagged_item())),
    );
    let err = decode_body(
        &schema,
        br#"{"items": [{"title": "ok"}, {"title": "bad", "rating": -1}]}"#,
    )
    .unwrap_err();
    assert_eq!(err.issues().len(), 1);
    assert_eq!(err.issues()[0].location, "body.items.1.rating");
    assert_eq!(err.issues()[0].kind, "greater_than_equal");
}

#[test]
fn test_bind_request_binds_every_location() {
    let router = Router::from_routes([RouteMeta::post("/carts/{cart_id}", "cart")
        .path_param("cart_id", ParamType::Integer)
        .query("express", ParamType::Boolean)
        .body("item", tagged_item())])
    .unwrap();

    let mut m = router.route(Method::POST, "/carts/12").unwrap();
    m.query_params = query(&[("express", "on")]);
    let args = bind_request(&m, Some(br#"{"title": "Pen"}"#.as_slice())).unwrap();

    assert_eq!(args.get("cart_id"), Some(&json!(12)));
    assert_eq!(args.get("express"), Some(&json!(true)));
    assert_eq!(args.get("item").and_then(|v| v.get("title")), Some(&json!("Pen")));
    assert_eq!(args.get("nope"), None);
}

#[test]
fn test_bind_request_reports_parameters_before_body() {
    let router = Router::from_routes([RouteMeta::post("/carts/{cart_id}", "cart")
        .path_param("cart_id", ParamType::Integer)
        .query("express", ParamType::Boolean)
        .body("item", tagged_item())])
    .unwrap();

    let m = router.route(Method::POST, "/carts/twelve").unwrap();
    let err = bind_request(&m, Some(b"not json".as_slice())).unwrap_err();
    assert!(matches!(err, RequestError::BadRequest { .. }));
    let locations: Vec<&str> = err.issues().iter().map(|i| i.location.as_str()).collect();
    assert_eq!(locations, vec!["path.cart_id", "query.express"]);
}

#[test]
fn test_bind_request_ignores_body_on_bodiless_route() {
    let router = Router::from_routes([RouteMeta::get("/ping", "ping")]).unwrap();
    let m = router.route(Method::GET, "/ping").unwrap();
    let args = bind_request(&m, Some(b"{garbage".as_slice())).unwrap();
    assert!(args.body.is_empty());
}

#[test]
fn test_error_json_shape() {
    let err = decode_body(&tagged_item(), b"{}").unwrap_err();
    let body: Value = err.to_json();
    assert_eq!(
        body,
        json!({
            "error": "Validation Error",
            "details": [
                { "location": "body.title", "kind": "missing", "message": "Field required" }
            ]
        })
    );
}
