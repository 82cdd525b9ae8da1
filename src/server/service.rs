use http::Method;
use may_minihttp::{HttpService, Request, Response};
use serde_json::json;
use std::io;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, info_span};

use super::request::{parse_request, ParsedRequest};
use super::response::write_handler_response;
use crate::dispatcher::{Dispatcher, HandlerRequest, HandlerResponse};
use crate::ids::{RequestId, REQUEST_ID_HEADER};
use crate::router::Router;
use crate::validator::{bind_request, RequestError};

/// The request pipeline: health check, route, bind, dispatch.
///
/// Router and dispatcher are read-only after startup, so the service is cloned
/// into every connection coroutine without locks.
#[derive(Clone)]
pub struct AppService {
    pub router: Arc<Router>,
    pub dispatcher: Arc<Dispatcher>,
}

/// Basic health check response, `{ "status": "ok" }`.
#[must_use]
pub fn health_response() -> HandlerResponse {
    HandlerResponse::json(200, json!({ "status": "ok" }))
}

impl AppService {
    #[must_use]
    pub fn new(router: Router, dispatcher: Dispatcher) -> Self {
        Self {
            router: Arc::new(router),
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// Run one parsed request through the pipeline.
    ///
    /// Rejected requests never reach a handler: an unknown route is `404`,
    /// bad path or query parameters are `400`, an invalid body is `422`.
    #[must_use]
    pub fn handle(&self, req: &ParsedRequest) -> HandlerResponse {
        let started = Instant::now();
        let request_id = RequestId::from_header_or_new(req.header(REQUEST_ID_HEADER));
        let span = info_span!(
            "request",
            request_id = %request_id,
            method = %req.method,
            path = %req.path
        );

        let prepared = span.in_scope(|| self.prepare(request_id, req));
        let response = match prepared {
            Ok(handler_request) => {
                let handler_name = handler_request.handler_name.clone();
                self.dispatcher.dispatch(handler_request).unwrap_or_else(|| {
                    error!(
                        request_id = %request_id,
                        handler_name = %handler_name,
                        "Handler failed or not registered"
                    );
                    HandlerResponse::json(
                        500,
                        json!({
                            "error": "Handler failed or not registered",
                            "method": req.method,
                            "path": req.path,
                        }),
                    )
                })
            }
            Err(response) => response,
        };

        span.in_scope(|| {
            info!(
                status = response.status,
                latency_us = started.elapsed().as_micros() as u64,
                "Request complete"
            );
        });
        response
    }

    /// Everything up to the handler call; an `Err` is the response to send.
    fn prepare(
        &self,
        request_id: RequestId,
        req: &ParsedRequest,
    ) -> Result<HandlerRequest, HandlerResponse> {
        if req.method == "GET" && req.path == "/health" {
            return Err(health_response());
        }

        let not_found = || {
            HandlerResponse::from_request_error(&RequestError::NotFound {
                method: req.method.clone(),
                path: req.path.clone(),
            })
        };

        let Ok(method) = Method::from_bytes(req.method.as_bytes()) else {
            debug!("Unparseable method");
            return Err(not_found());
        };
        let Some(mut route_match) = self.router.route(method, &req.path) else {
            return Err(not_found());
        };
        route_match.query_params = req.query_params.clone();

        match bind_request(&route_match, req.body.as_deref()) {
            Ok(args) => Ok(HandlerRequest::new(request_id, &req.path, &route_match, args)),
            Err(err) => {
                info!(
                    handler_name = %route_match.handler_name,
                    status = err.status(),
                    error = %err,
                    "Request rejected"
                );
                Err(HandlerResponse::from_request_error(&err))
            }
        }
    }
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let parsed = parse_request(req);
        let response = self.handle(&parsed);
        write_handler_response(res, response);
        Ok(())
    }
}
