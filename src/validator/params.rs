//! Path and query parameter coercion.

use serde_json::Value;
use std::sync::Arc;

use super::error::{RequestError, ValidationIssue};
use crate::router::ParamType;

/// Parse the boolean spellings accepted in paths, queries and lenient bodies.
pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Convert one raw string to the declared parameter type.
///
/// On failure returns `(kind, message)` for a [`ValidationIssue`].
pub(crate) fn convert_scalar(raw: &str, ty: ParamType) -> Result<Value, (&'static str, String)> {
    match ty {
        ParamType::String => Ok(Value::String(raw.to_string())),
        ParamType::Integer => raw.trim().parse::<i64>().map(Value::from).map_err(|_| {
            (
                "int_parsing",
                format!("Input should be a valid integer, unable to parse '{raw}' as an integer"),
            )
        }),
        ParamType::Number => match raw.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Value::from(n)),
            _ => Err((
                "float_parsing",
                format!("Input should be a valid number, unable to parse '{raw}' as a number"),
            )),
        },
        ParamType::Boolean => parse_bool(raw).map(Value::Bool).ok_or_else(|| {
            (
                "bool_parsing",
                format!("Input should be a valid boolean, unable to interpret '{raw}'"),
            )
        }),
    }
}

pub(crate) fn path_value(name: &str, raw: &str, ty: ParamType) -> Result<Value, ValidationIssue> {
    convert_scalar(raw, ty)
        .map_err(|(kind, message)| ValidationIssue::new(format!("path.{name}"), kind, message))
}

pub(crate) fn query_value(
    name: &str,
    ty: ParamType,
    default: Option<&Value>,
    raw_query: &[(Arc<str>, String)],
) -> Result<Value, ValidationIssue> {
    let raw = raw_query
        .iter()
        .rfind(|(k, _)| k.as_ref() == name)
        .map(|(_, v)| v.as_str());

    match (raw, default) {
        (Some(raw), _) => convert_scalar(raw, ty).map_err(|(kind, message)| {
            ValidationIssue::new(format!("query.{name}"), kind, message)
        }),
        (None, Some(default)) => Ok(default.clone()),
        (None, None) => Err(ValidationIssue::new(
            format!("query.{name}"),
            "missing",
            format!("missing required query parameter '{name}'"),
        )),
    }
}

/// Convert a raw path segment to its declared type.
///
/// # Errors
///
/// [`RequestError::BadRequest`] when the segment does not parse as the declared type.
pub fn coerce_path(name: &str, raw: &str, ty: ParamType) -> Result<Value, RequestError> {
    path_value(name, raw, ty).map_err(|issue| RequestError::BadRequest {
        issues: vec![issue],
    })
}

/// Look up a query parameter and convert it to its declared type.
///
/// If the parameter is repeated the last value wins. An absent parameter takes
/// `default` verbatim.
///
/// # Errors
///
/// [`RequestError::BadRequest`] when the parameter is absent without a default,
/// or present but not convertible.
pub fn coerce_query(
    name: &str,
    ty: ParamType,
    default: Option<&Value>,
    raw_query: &[(Arc<str>, String)],
) -> Result<Value, RequestError> {
    query_value(name, ty, default, raw_query).map_err(|issue| RequestError::BadRequest {
        issues: vec![issue],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> Vec<(Arc<str>, String)> {
        pairs
            .iter()
            .map(|(k, v)| (Arc::from(*k), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_coerce_path_integer() {
        assert_eq!(coerce_path("id", "42", ParamType::Integer).unwrap(), Value::from(42));
        assert_eq!(coerce_path("id", "-7", ParamType::Integer).unwrap(), Value::from(-7));
        let err = coerce_path("id", "abc", ParamType::Integer).unwrap_err();
        assert_eq!(err.status(), 400);
        assert_eq!(err.issues()[0].location, "path.id");
        assert_eq!(err.issues()[0].kind, "int_parsing");
        assert!(coerce_path("id", "1.5", ParamType::Integer).is_err());
    }

    #[test]
    fn test_coerce_path_string_is_verbatim() {
        assert_eq!(
            coerce_path("id", "007", ParamType::String).unwrap(),
            Value::String("007".into())
        );
    }

    #[test]
    fn test_coerce_scalar_number_and_bool() {
        assert_eq!(convert_scalar("2.5", ParamType::Number).unwrap(), Value::from(2.5));
        assert!(convert_scalar("NaN", ParamType::Number).is_err());
        assert_eq!(convert_scalar("YES", ParamType::Boolean).unwrap(), Value::Bool(true));
        assert_eq!(convert_scalar("off", ParamType::Boolean).unwrap(), Value::Bool(false));
        assert!(convert_scalar("maybe", ParamType::Boolean).is_err());
    }

    #[test]
    fn test_coerce_query_missing_without_default() {
        let err = coerce_query("page", ParamType::Integer, None, &query(&[])).unwrap_err();
        assert_eq!(err.status(), 400);
        assert_eq!(err.issues()[0].location, "query.page");
        assert!(err.issues()[0].message.contains("missing required query parameter"));
    }

    #[test]
    fn test_coerce_query_default_used_verbatim() {
        let default = Value::from(1);
        let v = coerce_query("id", ParamType::String, Some(&default), &query(&[])).unwrap();
        assert_eq!(v, Value::from(1));
    }

    #[test]
    fn test_coerce_query_last_value_wins() {
        let raw = query(&[("limit", "10"), ("limit", "20")]);
        let v = coerce_query("limit", ParamType::Integer, None, &raw).unwrap();
        assert_eq!(v, Value::from(20));
    }

    #[test]
    fn test_coerce_query_present_but_invalid() {
        let default = Value::from(0);
        let raw = query(&[("qty", "lots")]);
        let err = coerce_query("qty", ParamType::Integer, Some(&default), &raw).unwrap_err();
        assert_eq!(err.issues()[0].kind, "int_parsing");
    }
}
