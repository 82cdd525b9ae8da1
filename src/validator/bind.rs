use serde_json::Value;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::debug;

use super::body::decode_body_params;
use super::error::RequestError;
use super::params::{path_value, query_value};
use crate::router::{RouteMatch, MAX_INLINE_PARAMS};

/// Decoded `(name, value)` pairs handed to handlers.
pub type ValueVec = SmallVec<[(Arc<str>, Value); MAX_INLINE_PARAMS]>;

/// Arguments of one request after coercion and validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArgs {
    pub path: ValueVec,
    pub query: ValueVec,
    /// Decoded body models, keyed by body parameter name
    pub body: ValueVec,
}

impl BoundArgs {
    /// Look up a bound value by name: path first, then query, then body.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.path
            .iter()
            .chain(self.query.iter())
            .chain(self.body.iter())
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v)
    }
}

/// Coerce and validate everything a matched route declares.
///
/// Path and query problems are collected together and reported as one
/// [`RequestError::BadRequest`]. The body is only decoded once the parameters
/// are valid; its problems are reported as one [`RequestError::Validation`].
/// A body sent to a route that declares no body parameters is ignored.
///
/// # Errors
///
/// See above. The handler must not run when this fails.
pub fn bind_request(
    route_match: &RouteMatch,
    body: Option<&[u8]>,
) -> Result<BoundArgs, RequestError> {
    let route = &route_match.route;
    let mut args = BoundArgs::default();
    let mut issues = Vec::new();

    for param in route.path_params() {
        let raw = route_match.get_path_param(&param.name).unwrap_or_default();
        match path_value(&param.name, raw, param.param_type) {
            Ok(v) => args.path.push((Arc::from(param.name.as_str()), v)),
            Err(issue) => issues.push(issue),
        }
    }

    for param in route.query_params() {
        match query_value(
            &param.name,
            param.param_type,
            param.default.as_ref(),
            &route_match.query_params,
        ) {
            Ok(v) => args.query.push((Arc::from(param.name.as_str()), v)),
            Err(issue) => issues.push(issue),
        }
    }

    if !issues.is_empty() {
        debug!(
            handler_name = %route_match.handler_name,
            issues = issues.len(),
            "Parameter binding failed"
        );
        return Err(RequestError::BadRequest { issues });
    }

    if !route.body.is_empty() {
        let decoded = decode_body_params(&route.body, body, &mut issues);
        if !issues.is_empty() {
            debug!(
                handler_name = %route_match.handler_name,
                issues = issues.len(),
                "Body validation failed"
            );
            return Err(RequestError::Validation { issues });
        }
        args.body = decoded
            .into_iter()
            .map(|(name, v)| (Arc::from(name.as_str()), v))
            .collect();
    }

    Ok(args)
}
