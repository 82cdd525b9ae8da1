use http::Method;
use std::fmt;

/// Route registration error
///
/// Returned by [`Router::register`](super::Router::register) when a route
/// cannot be added to the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// A route with the same method and path template is already registered
    DuplicateRoute { method: Method, template: String },
    /// The path template could not be parsed
    InvalidTemplate { template: String, reason: String },
    /// A path parameter is declared but does not appear in the template
    UnknownPathParam { template: String, name: String },
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::DuplicateRoute { method, template } => {
                write!(f, "route {method} {template} is already registered")
            }
            RouterError::InvalidTemplate { template, reason } => {
                write!(f, "invalid path template '{template}': {reason}")
            }
            RouterError::UnknownPathParam { template, name } => {
                write!(
                    f,
                    "path parameter '{name}' is declared but '{template}' has no {{{name}}} segment"
                )
            }
        }
    }
}

impl std::error::Error for RouterError {}
