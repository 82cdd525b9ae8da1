use may_minihttp::Request;
use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::router::ParamVec;

/// Parsed HTTP request data used by `AppService`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedRequest {
    /// HTTP method as sent (e.g. `GET`)
    pub method: String,
    /// Request path without the query string
    pub path: String,
    /// HTTP headers (lowercase keys)
    pub headers: HashMap<String, String>,
    /// Form-decoded query parameters, in request order
    pub query_params: ParamVec,
    /// Raw body bytes, if any were sent
    pub body: Option<Vec<u8>>,
}

impl ParsedRequest {
    /// Build a request without going through the wire; used by tests and benches.
    #[must_use]
    pub fn new(method: &str, target: &str, body: Option<&[u8]>) -> Self {
        let (path, _) = split_target(target);
        Self {
            method: method.to_string(),
            path: path.to_string(),
            headers: HashMap::new(),
            query_params: parse_query_params(target),
            body: body.map(<[u8]>::to_vec),
        }
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

fn split_target(target: &str) -> (&str, Option<&str>) {
    match target.split_once('?') {
        Some((path, query)) => (if path.is_empty() { "/" } else { path }, Some(query)),
        None => (target, None),
    }
}

/// Parse query string parameters from a request target.
///
/// Everything after the first `?` is form-url-decoded. Repeated keys are
/// all kept, in order; consumers apply last-value-wins.
#[must_use]
pub fn parse_query_params(target: &str) -> ParamVec {
    match split_target(target) {
        (_, Some(query)) => url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (Arc::from(k.as_ref()), v.into_owned()))
            .collect(),
        _ => ParamVec::new(),
    }
}

/// Extract method, path, headers, query and body from a `may_minihttp::Request`.
pub fn parse_request(req: Request) -> ParsedRequest {
    let method = req.method().to_string();
    let target = req.path().to_string();
    let (path, _) = split_target(&target);
    let path = path.to_string();

    let headers: HashMap<String, String> = req
        .headers()
        .iter()
        .map(|h| {
            (
                h.name.to_ascii_lowercase(),
                String::from_utf8_lossy(h.value).to_string(),
            )
        })
        .collect();

    let query_params = parse_query_params(&target);

    let mut bytes = Vec::new();
    let body = match req.body().read_to_end(&mut bytes) {
        Ok(0) => None,
        Ok(size) => {
            debug!(
                body_size_bytes = size,
                content_type = headers.get("content-type").map_or("", String::as_str),
                "Request body read"
            );
            Some(bytes)
        }
        Err(e) => {
            warn!(error = %e, "Failed to read request body");
            None
        }
    };

    debug!(
        method = %method,
        path = %path,
        headers_count = headers.len(),
        query_count = query_params.len(),
        "HTTP request parsed"
    );

    ParsedRequest {
        method,
        path,
        headers,
        query_params,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_params() {
        let q = parse_query_params("/p?x=1&y=hello%20world&x=2");
        let pairs: Vec<(&str, &str)> = q.iter().map(|(k, v)| (k.as_ref(), v.as_str())).collect();
        assert_eq!(pairs, vec![("x", "1"), ("y", "hello world"), ("x", "2")]);
        assert!(parse_query_params("/p").is_empty());
    }

    #[test]
    fn test_parsed_request_splits_target() {
        let req = ParsedRequest::new("GET", "/items?page=1&limit=2", None);
        assert_eq!(req.path, "/items");
        assert_eq!(req.query_params.len(), 2);
        assert!(req.body.is_none());
        assert_eq!(ParsedRequest::new("GET", "?a=1", None).path, "/");
    }
}
