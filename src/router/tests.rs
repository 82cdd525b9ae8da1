use super::{ParamType, RouteMeta, Router, RouterError};
use http::Method;

#[test]
fn test_root_path() {
    let router = Router::from_routes([RouteMeta::get("/", "index")]).unwrap();
    let m = router.route(Method::GET, "/").unwrap();
    assert_eq!(m.handler_name, "index");
    assert!(m.path_params.is_empty());
}

#[test]
fn test_duplicate_route_rejected() {
    let mut router = Router::new();
    router.register(RouteMeta::get("/items", "items")).unwrap();
    let err = router.register(RouteMeta::get("/items/", "items_again")).unwrap_err();
    assert_eq!(
        err,
        RouterError::DuplicateRoute {
            method: Method::GET,
            template: "/items".to_string()
        }
    );
    // Same template, different method is fine
    assert!(router.register(RouteMeta::post("/items", "create")).is_ok());
}

#[test]
fn test_unknown_path_param_rejected() {
    let mut router = Router::new();
    let err = router
        .register(RouteMeta::get("/persons/{id}", "persons").path_param("pid", ParamType::Integer))
        .unwrap_err();
    assert!(matches!(err, RouterError::UnknownPathParam { ref name, .. } if name == "pid"));
}

#[test]
fn test_implicit_path_params_declared() {
    let mut router = Router::new();
    let route = router.register(RouteMeta::get("/user/{id:int}", "user")).unwrap();
    assert_eq!(
        route.path_param_meta("id").map(|p| p.param_type),
        Some(ParamType::Integer)
    );
    let route = router.register(RouteMeta::get("/person/{id}", "person")).unwrap();
    assert_eq!(
        route.path_param_meta("id").map(|p| p.param_type),
        Some(ParamType::String)
    );
}

#[test]
fn test_percent_decoded_segments() {
    let router = Router::from_routes([RouteMeta::get("/profile/{username}", "profile")]).unwrap();
    let m = router.route(Method::GET, "/profile/jane%20doe").unwrap();
    assert_eq!(m.get_path_param("username"), Some("jane doe"));
}

#[test]
fn test_no_match_returns_none() {
    let router = Router::from_routes([RouteMeta::get("/persons/{id}", "persons")]).unwrap();
    assert!(router.route(Method::GET, "/persons").is_none());
    assert!(router.route(Method::GET, "/persons/1/extra").is_none());
    assert!(router.route(Method::DELETE, "/persons/1").is_none());
}

#[test]
fn test_dump_routes_in_registration_order() {
    let router = Router::from_routes([
        RouteMeta::get("/", "index"),
        RouteMeta::post("/students", "student"),
    ])
    .unwrap();
    assert_eq!(
        router.dump_routes(),
        vec!["GET / -> index".to_string(), "POST /students -> student".to_string()]
    );
}
