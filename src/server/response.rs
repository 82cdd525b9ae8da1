use may_minihttp::Response;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::{Mutex, OnceLock, PoisonError};
use tracing::{error, warn};

use crate::dispatcher::HandlerResponse;

pub(crate) fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "OK",
    }
}

/// `may_minihttp` only accepts `'static` header lines. Each distinct line is
/// leaked once and reused afterwards.
fn static_header_line(name: &str, value: &str) -> &'static str {
    static LINES: OnceLock<Mutex<HashSet<&'static str>>> = OnceLock::new();
    let line = format!("{name}: {value}");
    let mut lines = LINES
        .get_or_init(|| Mutex::new(HashSet::new()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    if let Some(existing) = lines.get(line.as_str()) {
        return existing;
    }
    let leaked: &'static str = Box::leak(line.into_boxed_str());
    lines.insert(leaked);
    leaked
}

/// Serialize a handler response onto the wire.
///
/// Every header in `response.headers` is written. Without a `content-type`
/// header, string bodies go out as `text/plain` and everything else as JSON.
/// A string body under a JSON content type is written as a JSON string.
pub fn write_handler_response(res: &mut Response, response: HandlerResponse) {
    res.status_code(usize::from(response.status), status_reason(response.status));
    let content_type = response.get_header("content-type").map(str::to_owned);
    for (name, value) in &response.headers {
        if name.contains(['\r', '\n']) || value.contains(['\r', '\n']) {
            warn!(header = %name, "Dropping response header with a line break");
            continue;
        }
        res.header(static_header_line(name, value));
    }

    let as_text = match (&response.body, content_type.as_deref()) {
        (Value::String(_), None) => {
            res.header("Content-Type: text/plain; charset=utf-8");
            true
        }
        (_, None) => {
            res.header("Content-Type: application/json");
            false
        }
        (Value::String(_), Some(ct)) => !ct.contains("json"),
        (_, Some(_)) => false,
    };

    match response.body {
        Value::String(s) if as_text => res.body_vec(s.into_bytes()),
        other => match serde_json::to_vec(&other) {
            Ok(bytes) => res.body_vec(bytes),
            Err(e) => {
                error!(error = %e, "Failed to serialize response body");
                res.status_code(500, status_reason(500));
                res.body_vec(br#"{"error":"Failed to serialize response"}"#.to_vec());
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reason() {
        assert_eq!(status_reason(200), "OK");
        assert_eq!(status_reason(404), "Not Found");
        assert_eq!(status_reason(422), "Unprocessable Entity");
    }

    #[test]
    fn test_header_lines_are_interned() {
        let a = static_header_line("x-custom", "yes");
        let b = static_header_line("x-custom", &String::from("yes"));
        assert_eq!(a, "x-custom: yes");
        assert!(std::ptr::eq(a, b));
        assert_ne!(static_header_line("x-custom", "no"), a);
    }
}
