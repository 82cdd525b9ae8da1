use crate::schema::Schema;
use http::Method;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Declared type of a path or query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    #[default]
    String,
    Integer,
    Number,
    Boolean,
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterLocation::Path => write!(f, "path"),
            ParameterLocation::Query => write!(f, "query"),
        }
    }
}

/// A typed path or query parameter declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterMeta {
    pub name: String,
    pub location: ParameterLocation,
    pub param_type: ParamType,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// A named body parameter bound to a schema.
///
/// With a single body parameter the request body *is* the model; with several,
/// each model is embedded in the body under its parameter name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodyParam {
    pub name: String,
    pub schema: Arc<Schema>,
}

/// Everything the router and validator need to know about one route.
#[derive(Debug, Clone, Serialize)]
pub struct RouteMeta {
    #[serde(serialize_with = "serialize_method")]
    pub method: Method,
    pub path_pattern: String,
    pub handler_name: String,
    pub parameters: Vec<ParameterMeta>,
    pub body: Vec<BodyParam>,
}

fn serialize_method<S: serde::Serializer>(method: &Method, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(method.as_str())
}

impl RouteMeta {
    #[must_use]
    pub fn new(method: Method, path_pattern: &str, handler_name: &str) -> Self {
        Self {
            method,
            path_pattern: path_pattern.to_string(),
            handler_name: handler_name.to_string(),
            parameters: Vec::new(),
            body: Vec::new(),
        }
    }

    #[must_use]
    pub fn get(path_pattern: &str, handler_name: &str) -> Self {
        Self::new(Method::GET, path_pattern, handler_name)
    }

    #[must_use]
    pub fn post(path_pattern: &str, handler_name: &str) -> Self {
        Self::new(Method::POST, path_pattern, handler_name)
    }

    /// Declare the type of a path segment. Undeclared segments are strings.
    #[must_use]
    pub fn path_param(mut self, name: &str, param_type: ParamType) -> Self {
        self.parameters.retain(|p| {
            !(p.location == ParameterLocation::Path && p.name == name)
        });
        self.parameters.push(ParameterMeta {
            name: name.to_string(),
            location: ParameterLocation::Path,
            param_type,
            required: true,
            default: None,
        });
        self
    }

    /// Declare a required query parameter.
    #[must_use]
    pub fn query(mut self, name: &str, param_type: ParamType) -> Self {
        self.parameters.push(ParameterMeta {
            name: name.to_string(),
            location: ParameterLocation::Query,
            param_type,
            required: true,
            default: None,
        });
        self
    }

    /// Declare a query parameter that falls back to `default` when absent.
    #[must_use]
    pub fn query_default(
        mut self,
        name: &str,
        param_type: ParamType,
        default: impl Into<Value>,
    ) -> Self {
        self.parameters.push(ParameterMeta {
            name: name.to_string(),
            location: ParameterLocation::Query,
            param_type,
            required: false,
            default: Some(default.into()),
        });
        self
    }

    /// Bind a body parameter to a schema.
    #[must_use]
    pub fn body(mut self, name: &str, schema: Schema) -> Self {
        self.body.push(BodyParam {
            name: name.to_string(),
            schema: Arc::new(schema),
        });
        self
    }

    pub fn path_params(&self) -> impl Iterator<Item = &ParameterMeta> {
        self.parameters
            .iter()
            .filter(|p| p.location == ParameterLocation::Path)
    }

    pub fn query_params(&self) -> impl Iterator<Item = &ParameterMeta> {
        self.parameters
            .iter()
            .filter(|p| p.location == ParameterLocation::Query)
    }

    #[must_use]
    pub fn path_param_meta(&self, name: &str) -> Option<&ParameterMeta> {
        self.path_params().find(|p| p.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;

    #[test]
    fn test_builder_collects_parameters() {
        let route = RouteMeta::post("/orders/{order_id}", "order_detail")
            .path_param("order_id", ParamType::Integer)
            .query("customer", ParamType::String)
            .body("order", Schema::new("Order").required("item_name", FieldType::String));

        assert_eq!(route.method, Method::POST);
        assert_eq!(route.path_params().count(), 1);
        assert_eq!(route.query_params().count(), 1);
        assert_eq!(route.body.len(), 1);
        assert_eq!(
            route.path_param_meta("order_id").map(|p| p.param_type),
            Some(ParamType::Integer)
        );
    }

    #[test]
    fn test_redeclared_path_param_replaces_previous() {
        let route = RouteMeta::get("/persons/{id}", "persons")
            .path_param("id", ParamType::String)
            .path_param("id", ParamType::Integer);
        assert_eq!(route.path_params().count(), 1);
        assert_eq!(
            route.path_param_meta("id").map(|p| p.param_type),
            Some(ParamType::Integer)
        );
    }

    #[test]
    fn test_query_default_is_optional() {
        let route = RouteMeta::get("/products", "products").query_default(
            "id",
            ParamType::String,
            "1",
        );
        let param = route.query_params().next().map(|p| (p.required, p.default.clone()));
        assert_eq!(param, Some((false, Some(Value::from("1")))));
    }
}
