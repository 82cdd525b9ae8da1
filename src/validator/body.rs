//! Request body decoding against declarative schemas.
//!
//! Validation never stops at the first problem: every offending field is
//! reported, including fields nested inside lists and sub-models.

use serde_json::{Map, Value};
use std::collections::HashSet;

use super::error::{RequestError, ValidationIssue};
use super::params::parse_bool;
use crate::router::BodyParam;
use crate::schema::{Constraint, FieldSpec, FieldType, Schema};

/// Decode a raw JSON body against one schema.
///
/// # Errors
///
/// [`RequestError::Validation`] listing every issue found: malformed JSON,
/// a non-object body, missing required fields, failed coercions and violated
/// constraints.
pub fn decode_body(schema: &Schema, raw: &[u8]) -> Result<Value, RequestError> {
    let mut issues = Vec::new();
    let json = parse_json(raw, &mut issues);
    let decoded = json.and_then(|json| validate_object(schema, &json, "body", &mut issues));
    match decoded {
        Some(value) if issues.is_empty() => Ok(value),
        _ => Err(RequestError::Validation { issues }),
    }
}

/// Decode the body parameters of a route.
///
/// A single parameter means the body is that model. Several parameters are
/// embedded in the body object under their names.
pub(crate) fn decode_body_params(
    params: &[BodyParam],
    raw: Option<&[u8]>,
    issues: &mut Vec<ValidationIssue>,
) -> Vec<(String, Value)> {
    if params.is_empty() {
        return Vec::new();
    }

    let raw = raw.filter(|b| b.iter().any(|c| !c.is_ascii_whitespace()));
    let Some(raw) = raw else {
        issues.push(ValidationIssue::new("body", "missing", "Request body required"));
        return Vec::new();
    };
    let Some(json) = parse_json(raw, issues) else {
        return Vec::new();
    };

    if let [single] = params {
        return validate_object(&single.schema, &json, "body", issues)
            .map(|v| vec![(single.name.clone(), v)])
            .unwrap_or_default();
    }

    let Some(object) = json.as_object() else {
        issues.push(ValidationIssue::new(
            "body",
            "model_type",
            "Input should be a valid dictionary or object",
        ));
        return Vec::new();
    };

    let mut decoded = Vec::with_capacity(params.len());
    for param in params {
        let location = format!("body.{}", param.name);
        match object.get(&param.name) {
            Some(value) => {
                if let Some(v) = validate_object(&param.schema, value, &location, issues) {
                    decoded.push((param.name.clone(), v));
                }
            }
            None => issues.push(ValidationIssue::new(location, "missing", "Field required")),
        }
    }
    decoded
}

fn parse_json(raw: &[u8], issues: &mut Vec<ValidationIssue>) -> Option<Value> {
    match serde_json::from_slice::<Value>(raw) {
        Ok(v) => Some(v),
        Err(e) => {
            issues.push(ValidationIssue::new(
                "body",
                "json_invalid",
                format!("JSON decode error: {e}"),
            ));
            None
        }
    }
}

/// Validate `input` as an object described by `schema`.
///
/// Returns the decoded object, or `None` if any field failed (issues are
/// appended either way). Unknown input fields are dropped.
pub(crate) fn validate_object(
    schema: &Schema,
    input: &Value,
    location: &str,
    issues: &mut Vec<ValidationIssue>,
) -> Option<Value> {
    let Some(object) = input.as_object() else {
        issues.push(ValidationIssue::new(
            location,
            "model_type",
            format!("Input should be a valid dictionary or object to build {}", schema.name),
        ));
        return None;
    };

    let mut out = Map::with_capacity(schema.fields.len());
    let mut ok = true;
    for field in &schema.fields {
        let field_location = format!("{location}.{}", field.name);
        match validate_field(field, object.get(&field.name), &field_location, issues) {
            Some(value) => {
                out.insert(field.name.clone(), value);
            }
            None => ok = false,
        }
    }
    ok.then_some(Value::Object(out))
}

fn validate_field(
    field: &FieldSpec,
    input: Option<&Value>,
    location: &str,
    issues: &mut Vec<ValidationIssue>,
) -> Option<Value> {
    let value = match input {
        None => {
            if let Some(default) = &field.default {
                return Some(default.clone());
            }
            if field.ty == FieldType::Computed {
                return Some(Value::Null);
            }
            issues.push(ValidationIssue::new(location, "missing", "Field required"));
            return None;
        }
        Some(Value::Null) if field.nullable => return Some(Value::Null),
        Some(value) => coerce_value(&field.ty, value, location, issues)?,
    };

    let mut ok = true;
    for constraint in &field.constraints {
        if !satisfies(constraint, &value) {
            issues.push(ValidationIssue::new(
                location,
                constraint.kind(),
                format!("Input should be {}", constraint.describe()),
            ));
            ok = false;
        }
    }
    ok.then_some(value)
}

fn coerce_value(
    ty: &FieldType,
    input: &Value,
    location: &str,
    issues: &mut Vec<ValidationIssue>,
) -> Option<Value> {
    match ty {
        FieldType::String => match input {
            Value::String(s) => Some(Value::String(s.clone())),
            _ => reject(issues, location, "string_type", "Input should be a valid string"),
        },
        FieldType::Integer => match input {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Value::from(i))
                } else if let Some(f) = n
                    .as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
                {
                    Some(Value::from(f as i64))
                } else if n.is_u64() {
                    reject(
                        issues,
                        location,
                        "int_type",
                        "Input should be a valid integer, value out of range",
                    )
                } else {
                    reject(
                        issues,
                        location,
                        "int_from_float",
                        "Input should be a valid integer, got a number with a fractional part",
                    )
                }
            }
            Value::String(s) => match s.trim().parse::<i64>() {
                Ok(i) => Some(Value::from(i)),
                Err(_) => reject(
                    issues,
                    location,
                    "int_parsing",
                    "Input should be a valid integer, unable to parse string as an integer",
                ),
            },
            _ => reject(issues, location, "int_type", "Input should be a valid integer"),
        },
        FieldType::Number => match input {
            Value::Number(_) => Some(input.clone()),
            Value::String(s) => match s.trim().parse::<f64>() {
                Ok(f) if f.is_finite() => Some(Value::from(f)),
                _ => reject(
                    issues,
                    location,
                    "float_parsing",
                    "Input should be a valid number, unable to parse string as a number",
                ),
            },
            _ => reject(issues, location, "float_type", "Input should be a valid number"),
        },
        FieldType::Boolean => match input {
            Value::Bool(b) => Some(Value::Bool(*b)),
            Value::Number(n) if n.as_i64() == Some(0) => Some(Value::Bool(false)),
            Value::Number(n) if n.as_i64() == Some(1) => Some(Value::Bool(true)),
            Value::String(s) => match parse_bool(s) {
                Some(b) => Some(Value::Bool(b)),
                None => reject(
                    issues,
                    location,
                    "bool_parsing",
                    "Input should be a valid boolean, unable to interpret input",
                ),
            },
            _ => reject(issues, location, "bool_type", "Input should be a valid boolean"),
        },
        FieldType::Computed => match input {
            Value::Null => Some(Value::Null),
            Value::String(s) if s.is_empty() => Some(Value::Null),
            _ => reject(
                issues,
                location,
                "computed",
                "Field is computed by the server; send null or omit it",
            ),
        },
        FieldType::List(item) | FieldType::Set(item) => {
            let Value::Array(values) = input else {
                let kind = if matches!(ty, FieldType::Set(_)) { "set_type" } else { "list_type" };
                return reject(issues, location, kind, "Input should be a valid list");
            };
            let is_set = matches!(ty, FieldType::Set(_));
            let mut out: Vec<Value> = Vec::with_capacity(values.len());
            let mut seen: HashSet<String> = HashSet::new();
            let mut ok = true;
            for (index, value) in values.iter().enumerate() {
                let item_location = format!("{location}.{index}");
                match coerce_value(item, value, &item_location, issues) {
                    Some(v) => {
                        // first occurrence wins; the canonical JSON text is the key
                        if is_set && !seen.insert(v.to_string()) {
                            continue;
                        }
                        out.push(v);
                    }
                    None => ok = false,
                }
            }
            ok.then_some(Value::Array(out))
        }
        FieldType::Object(schema) => validate_object(schema, input, location, issues),
    }
}

fn reject(
    issues: &mut Vec<ValidationIssue>,
    location: &str,
    kind: &str,
    message: &str,
) -> Option<Value> {
    issues.push(ValidationIssue::new(location, kind, message));
    None
}

fn satisfies(constraint: &Constraint, value: &Value) -> bool {
    match constraint {
        Constraint::Gt(bound) => value.as_f64().is_none_or(|v| v > *bound),
        Constraint::Ge(bound) => value.as_f64().is_none_or(|v| v >= *bound),
        Constraint::Lt(bound) => value.as_f64().is_none_or(|v| v < *bound),
        Constraint::Le(bound) => value.as_f64().is_none_or(|v| v <= *bound),
        Constraint::MinLength(n) => length_of(value).is_none_or(|len| len >= *n),
        Constraint::MaxLength(n) => length_of(value).is_none_or(|len| len <= *n),
    }
}

fn length_of(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(a) => Some(a.len()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn student() -> Schema {
        Schema::new("Student")
            .required("name", FieldType::String)
            .field(FieldSpec::new("score", FieldType::Integer).gt(0))
            .required("result", FieldType::Integer)
    }

    #[test]
    fn test_valid_body_decodes() {
        let v = decode_body(&student(), br#"{"name":"Abebe","score":"88","result":1}"#).unwrap();
        assert_eq!(v, json!({"name": "Abebe", "score": 88, "result": 1}));
    }

    #[test]
    fn test_all_issues_reported() {
        let err = decode_body(&student(), br#"{"name": 5, "score": 0}"#).unwrap_err();
        let locations: Vec<&str> = err.issues().iter().map(|i| i.location.as_str()).collect();
        assert_eq!(locations, vec!["body.name", "body.score", "body.result"]);
        let kinds: Vec<&str> = err.issues().iter().map(|i| i.kind.as_str()).collect();
        assert_eq!(kinds, vec!["string_type", "greater_than", "missing"]);
        assert_eq!(err.status(), 422);
    }

    #[test]
    fn test_malformed_json() {
        let err = decode_body(&student(), b"{not json").unwrap_err();
        assert_eq!(err.issues()[0].location, "body");
        assert_eq!(err.issues()[0].kind, "json_invalid");
    }

    #[test]
    fn test_non_object_body() {
        let err = decode_body(&student(), b"[1,2]").unwrap_err();
        assert_eq!(err.issues()[0].kind, "model_type");
    }

    #[test]
    fn test_integer_coercion_rules() {
        let schema = Schema::new("N").required("n", FieldType::Integer);
        assert_eq!(decode_body(&schema, br#"{"n": 3.0}"#).unwrap(), json!({"n": 3}));
        let err = decode_body(&schema, br#"{"n": 3.5}"#).unwrap_err();
        assert_eq!(err.issues()[0].kind, "int_from_float");
        let err = decode_body(&schema, br#"{"n": "x"}"#).unwrap_err();
        assert_eq!(err.issues()[0].kind, "int_parsing");
        let err = decode_body(&schema, br#"{"n": true}"#).unwrap_err();
        assert_eq!(err.issues()[0].kind, "int_type");
        let err = decode_body(&schema, br#"{"n": null}"#).unwrap_err();
        assert_eq!(err.issues()[0].kind, "int_type");
    }

    #[test]
    fn test_computed_field_accepts_null_empty_or_absent() {
        let schema = Schema::new("U")
            .required("score", FieldType::Integer)
            .computed("result");
        for body in [
            br#"{"score": 1}"#.as_slice(),
            br#"{"score": 1, "result": null}"#.as_slice(),
            br#"{"score": 1, "result": ""}"#.as_slice(),
        ] {
            assert_eq!(decode_body(&schema, body).unwrap(), json!({"score": 1, "result": null}));
        }
        let err = decode_body(&schema, br#"{"score": 1, "result": "Pass"}"#).unwrap_err();
        assert_eq!(err.issues()[0].kind, "computed");
    }

    #[test]
    fn test_defaults_and_optional_fields() {
        let schema = Schema::new("P")
            .field(FieldSpec::new("tags", FieldType::set(FieldType::String)).default_value(json!([])))
            .field(FieldSpec::new("note", FieldType::String).optional());
        assert_eq!(decode_body(&schema, b"{}").unwrap(), json!({"tags": [], "note": null}));
        assert_eq!(
            decode_body(&schema, br#"{"note": null}"#).unwrap(),
            json!({"tags": [], "note": null})
        );
    }

    #[test]
    fn test_set_removes_duplicates_in_order() {
        let schema = Schema::new("P").required("tags", FieldType::set(FieldType::String));
        let v = decode_body(&schema, br#"{"tags": ["b", "a", "b"]}"#).unwrap();
        assert_eq!(v, json!({"tags": ["b", "a"]}));
    }

    #[test]
    fn test_set_dedupes_after_coercion() {
        let schema = Schema::new("P").required("ids", FieldType::set(FieldType::Integer));
        let v = decode_body(&schema, br#"{"ids": [3, "3", 1, "1", 3.0]}"#).unwrap();
        assert_eq!(v, json!({"ids": [3, 1]}));
    }

    #[test]
    fn test_large_set_keeps_first_occurrences() {
        let schema = Schema::new("P").required("tags", FieldType::set(FieldType::String));
        let tags: Vec<String> = (0..50_000).map(|i| format!("tag-{}", i % 40_000)).collect();
        let body = serde_json::to_vec(&json!({ "tags": tags })).unwrap();
        let v = decode_body(&schema, &body).unwrap();
        let out = v["tags"].as_array().unwrap();
        assert_eq!(out.len(), 40_000);
        assert_eq!(out[0], "tag-0");
        assert_eq!(out[39_999], "tag-39999");
    }

    #[test]
    fn test_nested_locations() {
        let image = Schema::new("Image")
            .required("url", FieldType::String)
            .required("name", FieldType::String);
        let product = Schema::new("Product")
            .required("name", FieldType::String)
            .required("image", FieldType::list(FieldType::object(image)));
        let body = br#"{"name": "Phone", "image": [{"url": "a", "name": "b"}, {"name": 1}]}"#;
        let err = decode_body(&product, body).unwrap_err();
        let locations: Vec<&str> = err.issues().iter().map(|i| i.location.as_str()).collect();
        assert_eq!(locations, vec!["body.image.1.url", "body.image.1.name"]);
    }

    #[test]
    fn test_length_constraints() {
        let schema = Schema::new("S").field(
            FieldSpec::new("name", FieldType::String)
                .constraint(Constraint::MinLength(2))
                .constraint(Constraint::MaxLength(4)),
        );
        assert!(decode_body(&schema, br#"{"name": "abc"}"#).is_ok());
        let err = decode_body(&schema, br#"{"name": "a"}"#).unwrap_err();
        assert_eq!(err.issues()[0].kind, "too_short");
        let err = decode_body(&schema, br#"{"name": "abcde"}"#).unwrap_err();
        assert_eq!(err.issues()[0].kind, "too_long");
    }

    #[test]
    fn test_embedded_body_params() {
        let user = Schema::new("User")
            .required("name", FieldType::String)
            .required("email", FieldType::String);
        let item = Schema::new("Item").required("price", FieldType::Integer);
        let params = vec![
            BodyParam { name: "user".into(), schema: Arc::new(user) },
            BodyParam { name: "item".into(), schema: Arc::new(item) },
        ];

        let mut issues = Vec::new();
        let decoded = decode_body_params(
            &params,
            Some(br#"{"user": {"name": "a", "email": "b"}, "item": {"price": "5"}}"#.as_slice()),
            &mut issues,
        );
        assert!(issues.is_empty());
        assert_eq!(decoded[1], ("item".to_string(), json!({"price": 5})));

        let mut issues = Vec::new();
        decode_body_params(&params, Some(br#"{"user": {"name": "a"}}"#.as_slice()), &mut issues);
        let locations: Vec<&str> = issues.iter().map(|i| i.location.as_str()).collect();
        assert_eq!(locations, vec!["body.user.email", "body.item"]);
    }

    #[test]
    fn test_missing_body() {
        let params = vec![BodyParam { name: "s".into(), schema: Arc::new(student()) }];
        let mut issues = Vec::new();
        decode_body_params(&params, Some(b"  ".as_slice()), &mut issues);
        assert_eq!(issues[0].kind, "missing");
        let mut issues = Vec::new();
        decode_body_params(&params, None, &mut issues);
        assert_eq!(issues[0].location, "body");
    }
}
