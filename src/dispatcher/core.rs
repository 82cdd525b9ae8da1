use http::Method;
use may::coroutine;
use may::sync::mpsc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::ids::RequestId;
use crate::router::RouteMatch;
use crate::validator::{BoundArgs, RequestError, ValueVec};

/// Maximum inline response headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Response header storage.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Default stack size for handler coroutines (64KB)
pub const DEFAULT_HANDLER_STACK_SIZE: usize = 0x10000;

/// A validated request as seen by a handler.
///
/// Every value has already been coerced to its declared type; handlers never
/// see raw strings or unvalidated bodies.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// Unique request ID for tracing and correlation
    pub request_id: RequestId,
    pub method: Method,
    /// Concrete request path (without query string)
    pub path: String,
    pub handler_name: String,
    /// Typed path parameters, in template order
    pub path_params: ValueVec,
    /// Typed query parameters, defaults applied
    pub query_params: ValueVec,
    /// Decoded body models keyed by body parameter name
    pub body: ValueVec,
}

fn lookup<'a>(values: &'a ValueVec, name: &str) -> Option<&'a Value> {
    values
        .iter()
        .rfind(|(k, _)| k.as_ref() == name)
        .map(|(_, v)| v)
}

impl HandlerRequest {
    /// Assemble the request handed to a handler from a route match and its bound arguments.
    #[must_use]
    pub fn new(request_id: RequestId, path: &str, route_match: &RouteMatch, args: BoundArgs) -> Self {
        Self {
            request_id,
            method: route_match.route.method.clone(),
            path: path.to_string(),
            handler_name: route_match.handler_name.clone(),
            path_params: args.path,
            query_params: args.query,
            body: args.body,
        }
    }

    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&Value> {
        lookup(&self.path_params, name)
    }

    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&Value> {
        lookup(&self.query_params, name)
    }

    #[must_use]
    pub fn get_body(&self, name: &str) -> Option<&Value> {
        lookup(&self.body, name)
    }

    /// Deserialize all bound arguments as one object.
    ///
    /// Path parameters, then query parameters, then body models are merged
    /// into a single JSON object keyed by parameter name, so a struct with one
    /// field per handler argument can be filled in one step.
    ///
    /// # Errors
    ///
    /// If the merged object does not deserialize into `T`.
    pub fn args<T: DeserializeOwned>(&self) -> anyhow::Result<T> {
        let mut merged = Map::new();
        for (name, value) in self
            .path_params
            .iter()
            .chain(self.query_params.iter())
            .chain(self.body.iter())
        {
            merged.insert(name.to_string(), value.clone());
        }
        serde_json::from_value(Value::Object(merged))
            .map_err(|e| anyhow::anyhow!("invalid arguments for '{}': {e}", self.handler_name))
    }
}

/// Response produced by a handler.
///
/// A `Value::String` body is written as `text/plain`, anything else as JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandlerResponse {
    pub status: u16,
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    pub body: Value,
}

impl HandlerResponse {
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// JSON response with a `content-type` header.
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self::new(status, headers, body)
    }

    /// `200 OK` with a serialized handler result.
    ///
    /// A result that fails to serialize becomes a `500`.
    pub fn ok<T: Serialize>(result: &T) -> Self {
        match serde_json::to_value(result) {
            Ok(Value::String(s)) => Self::text(200, s),
            Ok(body) => Self::json(200, body),
            Err(e) => {
                error!(error = %e, "Failed to serialize handler response");
                Self::error(500, "Failed to serialize response")
            }
        }
    }

    /// Plain text response.
    #[must_use]
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "text/plain; charset=utf-8".to_string()));
        Self::new(status, headers, Value::String(body.into()))
    }

    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, json!({ "error": message }))
    }

    /// Response for a request rejected before its handler ran.
    #[must_use]
    pub fn from_request_error(err: &RequestError) -> Self {
        Self::json(err.status(), err.to_json())
    }

    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header.
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }
}

/// A request on its way to a handler coroutine, with the channel for its reply.
pub struct Envelope {
    pub request: HandlerRequest,
    pub reply_tx: mpsc::Sender<HandlerResponse>,
}

/// Channel into one handler coroutine.
pub type HandlerSender = mpsc::Sender<Envelope>;

/// Routes validated requests to handler coroutines by handler name.
///
/// Every registered handler runs in its own `may` coroutine, fed through a
/// channel. A handler panic is caught in the coroutine and answered with a
/// `500`; the coroutine keeps serving.
#[derive(Clone)]
pub struct Dispatcher {
    pub handlers: HashMap<String, HandlerSender>,
    stack_size: usize,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Dispatcher {
            handlers: HashMap::new(),
            stack_size: DEFAULT_HANDLER_STACK_SIZE,
        }
    }

    /// Stack size used for handler coroutines registered from now on.
    pub fn set_stack_size(&mut self, stack_size: usize) {
        self.stack_size = stack_size;
    }

    #[must_use]
    pub fn has_handler(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Spawn a coroutine running `handler_fn` and register it under `name`.
    ///
    /// Registering a name twice replaces the old handler; dropping its sender
    /// ends the old coroutine.
    ///
    /// # Errors
    ///
    /// If the coroutine cannot be spawned. The handler is not registered.
    pub fn register_fn<F>(&mut self, name: &str, handler_fn: F) -> io::Result<()>
    where
        F: Fn(HandlerRequest) -> HandlerResponse + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<Envelope>();
        let handler_name = name.to_string();
        let stack_size = self.stack_size;

        // SAFETY: the closure owns everything it touches (`Send + 'static`), and
        // the coroutine exits when every sender for `rx` is dropped.
        let spawned = unsafe {
            coroutine::Builder::new()
                .name(handler_name.clone())
                .stack_size(stack_size)
                .spawn(move || {
                    debug!(handler_name = %handler_name, stack_size, "Handler coroutine start");
                    for Envelope { request, reply_tx } in rx.iter() {
                        let request_id = request.request_id;
                        let started = Instant::now();

                        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(
                            || handler_fn(request),
                        ));
                        let response = match outcome {
                            Ok(response) => {
                                info!(
                                    request_id = %request_id,
                                    handler_name = %handler_name,
                                    status = response.status,
                                    execution_time_us = started.elapsed().as_micros() as u64,
                                    "Handler execution complete"
                                );
                                response
                            }
                            Err(panic) => {
                                let panic_message = panic
                                    .downcast_ref::<&str>()
                                    .map(|s| (*s).to_string())
                                    .or_else(|| panic.downcast_ref::<String>().cloned())
                                    .unwrap_or_else(|| "unknown panic".to_string());
                                error!(
                                    request_id = %request_id,
                                    handler_name = %handler_name,
                                    panic_message = %panic_message,
                                    "Handler panicked"
                                );
                                HandlerResponse::json(
                                    500,
                                    json!({
                                        "error": "Internal Server Error",
                                        "handler": handler_name,
                                    }),
                                )
                            }
                        };

                        if reply_tx.send(response).is_err() {
                            warn!(
                                request_id = %request_id,
                                handler_name = %handler_name,
                                "Reply channel closed before response was sent"
                            );
                        }
                    }
                    debug!(handler_name = %handler_name, "Handler coroutine exit");
                })
        };

        if let Err(e) = spawned {
            error!(handler_name = %name, error = %e, stack_size, "Failed to spawn handler coroutine");
            return Err(e);
        }

        if self.handlers.insert(name.to_string(), tx).is_some() {
            warn!(handler_name = %name, "Replaced existing handler");
        }
        info!(
            handler_name = %name,
            total_handlers = self.handlers.len(),
            "Handler registered"
        );
        Ok(())
    }

    /// Invoke the handler named in `request` and wait for its response.
    ///
    /// Returns `None` when no handler is registered under that name.
    #[must_use]
    pub fn dispatch(&self, request: HandlerRequest) -> Option<HandlerResponse> {
        let Some(tx) = self.handlers.get(&request.handler_name) else {
            error!(
                handler_name = %request.handler_name,
                available_handlers = self.handlers.len(),
                "Handler not found"
            );
            return None;
        };

        let request_id = request.request_id;
        let handler_name = request.handler_name.clone();
        let (reply_tx, reply_rx) = mpsc::channel();

        debug!(request_id = %request_id, handler_name = %handler_name, "Request dispatched to handler");
        if tx.send(Envelope { request, reply_tx }).is_err() {
            error!(
                request_id = %request_id,
                handler_name = %handler_name,
                "Handler coroutine is gone"
            );
            return Some(HandlerResponse::error(503, "Handler unavailable"));
        }

        match reply_rx.recv() {
            Ok(response) => Some(response),
            Err(e) => {
                error!(
                    request_id = %request_id,
                    handler_name = %handler_name,
                    error = %e,
                    "Handler dropped the request without replying"
                );
                Some(HandlerResponse::error(503, "Handler unavailable"))
            }
        }
    }
}
