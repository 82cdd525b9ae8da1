use anyhow::Result;
use http::Method;
use serde::Serialize;
use serde_json::json;
use std::convert::TryFrom;
use std::io;

use crate::dispatcher::{Dispatcher, HandlerRequest, HandlerResponse};
use crate::ids::RequestId;
use crate::validator::ValueVec;

/// Trait implemented by typed handlers.
///
/// A handler receives a [`TypedHandlerRequest`] whose `data` was built from
/// the validated [`HandlerRequest`], and returns a value serialized as the
/// response body.
pub trait Handler: Send + 'static {
    /// The typed request type (converted from HandlerRequest)
    type Request: TryFrom<HandlerRequest, Error = anyhow::Error> + Send + 'static;
    /// The typed response type (serialized to JSON, or text for a plain string)
    type Response: Serialize + Send + 'static;

    fn handle(&self, req: TypedHandlerRequest<Self::Request>) -> Self::Response;
}

/// Conversion from a generic [`HandlerRequest`] into a typed request.
pub trait TypedHandlerFor<T>: Sized {
    /// # Errors
    ///
    /// Returns an error if the request data cannot be converted to type T
    fn from_handler(req: HandlerRequest) -> Result<TypedHandlerRequest<T>>;
}

/// Typed request data passed to a [`Handler`].
#[derive(Debug, Clone)]
pub struct TypedHandlerRequest<T> {
    pub request_id: RequestId,
    pub method: Method,
    pub path: String,
    pub handler_name: String,
    pub path_params: ValueVec,
    pub query_params: ValueVec,
    /// Typed request data
    pub data: T,
}

impl<T> TypedHandlerFor<T> for TypedHandlerRequest<T>
where
    T: TryFrom<HandlerRequest, Error = anyhow::Error>,
{
    fn from_handler(req: HandlerRequest) -> Result<TypedHandlerRequest<T>> {
        let data = T::try_from(req.clone())?;

        Ok(TypedHandlerRequest {
            request_id: req.request_id,
            method: req.method,
            path: req.path,
            handler_name: req.handler_name,
            path_params: req.path_params,
            query_params: req.query_params,
            data,
        })
    }
}

/// Run a typed handler against one request.
///
/// A request that does not convert into `H::Request` is answered with `400`.
pub fn invoke_typed<H: Handler>(handler: &H, req: HandlerRequest) -> HandlerResponse {
    match TypedHandlerRequest::<H::Request>::from_handler(req) {
        Ok(typed) => HandlerResponse::ok(&handler.handle(typed)),
        Err(err) => HandlerResponse::json(
            400,
            json!({
                "error": "Invalid request data",
                "message": err.to_string(),
            }),
        ),
    }
}

impl Dispatcher {
    /// Register a typed handler under `name`.
    ///
    /// # Errors
    ///
    /// If the handler coroutine cannot be spawned.
    pub fn register_typed<H>(&mut self, name: &str, handler: H) -> io::Result<()>
    where
        H: Handler,
    {
        self.register_fn(name, move |req| invoke_typed(&handler, req))
    }
}
