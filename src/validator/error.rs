use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;

/// One field-level problem found while binding a request.
///
/// `location` is a dotted path such as `query.page`, `path.id` or
/// `body.product.image.1.url`; `kind` is a stable machine-readable code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub location: String,
    pub kind: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(
        location: impl Into<String>,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ValidationIssue {
            location: location.into(),
            kind: kind.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.location, self.message)
    }
}

/// Why a request was rejected before its handler ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// No registered route matches the method and path
    NotFound { method: String, path: String },
    /// A path or query parameter is missing or could not be coerced
    BadRequest { issues: Vec<ValidationIssue> },
    /// The request body violates its schema
    Validation { issues: Vec<ValidationIssue> },
}

impl RequestError {
    /// HTTP status used when the error is written to the wire.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            RequestError::NotFound { .. } => 404,
            RequestError::BadRequest { .. } => 400,
            RequestError::Validation { .. } => 422,
        }
    }

    /// Field-level issues; empty for `NotFound`.
    #[must_use]
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            RequestError::NotFound { .. } => &[],
            RequestError::BadRequest { issues } | RequestError::Validation { issues } => issues,
        }
    }

    /// JSON error body returned to the caller.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            RequestError::NotFound { method, path } => {
                json!({ "error": "Not Found", "method": method, "path": path })
            }
            RequestError::BadRequest { issues } => {
                json!({ "error": "Bad Request", "details": issues })
            }
            RequestError::Validation { issues } => {
                json!({ "error": "Validation Error", "details": issues })
            }
        }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::NotFound { method, path } => {
                write!(f, "no route matches {method} {path}")
            }
            RequestError::BadRequest { issues } => {
                write!(f, "bad request: {} invalid parameter(s)", issues.len())?;
                for issue in issues {
                    write!(f, "; {issue}")?;
                }
                Ok(())
            }
            RequestError::Validation { issues } => {
                write!(f, "request body failed validation: {} issue(s)", issues.len())?;
                for issue in issues {
                    write!(f, "; {issue}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for RequestError {}
