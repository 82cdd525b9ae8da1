use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Declared type of a single body field.
///
/// Scalar types coerce leniently (a numeric string is a valid integer), container
/// types recurse into their element type, and `Object` recurses into a nested schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "of", rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    Number,
    Boolean,
    /// A field the handler fills in. Input must be absent, `null` or `""`.
    Computed,
    List(Box<FieldType>),
    /// Like `List`, but duplicate items are dropped (first occurrence wins).
    Set(Box<FieldType>),
    Object(Arc<Schema>),
}

impl FieldType {
    /// Convenience constructor for `List(Box<T>)`.
    #[must_use]
    pub fn list(item: FieldType) -> Self {
        FieldType::List(Box::new(item))
    }

    /// Convenience constructor for `Set(Box<T>)`.
    #[must_use]
    pub fn set(item: FieldType) -> Self {
        FieldType::Set(Box::new(item))
    }

    /// Convenience constructor for a nested model.
    #[must_use]
    pub fn object(schema: Schema) -> Self {
        FieldType::Object(Arc::new(schema))
    }

    /// Short name used in error messages and route dumps.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            FieldType::String => "string".to_string(),
            FieldType::Integer => "integer".to_string(),
            FieldType::Number => "number".to_string(),
            FieldType::Boolean => "boolean".to_string(),
            FieldType::Computed => "computed".to_string(),
            FieldType::List(item) => format!("list[{}]", item.name()),
            FieldType::Set(item) => format!("set[{}]", item.name()),
            FieldType::Object(schema) => schema.name.clone(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// A predicate applied after coercion succeeds.
///
/// Numeric bounds apply to integers and numbers; length bounds apply to strings
/// and collections.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    Gt(f64),
    Ge(f64),
    Lt(f64),
    Le(f64),
    MinLength(usize),
    MaxLength(usize),
}

impl Constraint {
    /// Machine-readable kind reported when the constraint is violated.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Constraint::Gt(_) => "greater_than",
            Constraint::Ge(_) => "greater_than_equal",
            Constraint::Lt(_) => "less_than",
            Constraint::Le(_) => "less_than_equal",
            Constraint::MinLength(_) => "too_short",
            Constraint::MaxLength(_) => "too_long",
        }
    }

    /// Human-readable description, e.g. "greater than 0".
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Constraint::Gt(n) => format!("greater than {}", display_bound(*n)),
            Constraint::Ge(n) => format!("greater than or equal to {}", display_bound(*n)),
            Constraint::Lt(n) => format!("less than {}", display_bound(*n)),
            Constraint::Le(n) => format!("less than or equal to {}", display_bound(*n)),
            Constraint::MinLength(n) => format!("at least {n} item(s) long"),
            Constraint::MaxLength(n) => format!("at most {n} item(s) long"),
        }
    }
}

fn display_bound(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// One row of a schema: field name, type, optional default and constraints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSpec {
    pub name: String,
    pub ty: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
    pub nullable: bool,
}

impl FieldSpec {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
            constraints: Vec::new(),
            nullable: false,
        }
    }

    /// Value used when the field is absent from the input.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Accept `null` and default to `null` when absent.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.nullable = true;
        if self.default.is_none() {
            self.default = Some(Value::Null);
        }
        self
    }

    #[must_use]
    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    #[must_use]
    pub fn gt(self, bound: impl Into<f64>) -> Self {
        self.constraint(Constraint::Gt(bound.into()))
    }

    #[must_use]
    pub fn ge(self, bound: impl Into<f64>) -> Self {
        self.constraint(Constraint::Ge(bound.into()))
    }
}

/// A named, ordered table of fields describing a request or response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    pub name: String,
    pub fields: Vec<FieldSpec>,
}

impl Schema {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a fully specified field.
    #[must_use]
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Append a required field with no constraints.
    #[must_use]
    pub fn required(self, name: &str, ty: FieldType) -> Self {
        self.field(FieldSpec::new(name, ty))
    }

    /// Append a computed field (filled in by the handler).
    #[must_use]
    pub fn computed(self, name: &str) -> Self {
        self.field(FieldSpec::new(name, FieldType::Computed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_and_defaults() {
        let schema = Schema::new("Item")
            .required("name", FieldType::String)
            .field(FieldSpec::new("qty", FieldType::Integer).default_value(0))
            .field(FieldSpec::new("note", FieldType::String).optional())
            .computed("total");

        let names: Vec<&str> = schema.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["name", "qty", "note", "total"]);
        assert_eq!(schema.fields[0].default, None);
        assert_eq!(schema.fields[1].default, Some(Value::from(0)));
        assert_eq!(schema.fields[2].default, Some(Value::Null));
        assert_eq!(schema.fields[3].ty, FieldType::Computed);
    }

    #[test]
    fn test_type_names() {
        assert_eq!(FieldType::list(FieldType::Integer).name(), "list[integer]");
        assert_eq!(FieldType::set(FieldType::String).to_string(), "set[string]");
        let nested = FieldType::object(Schema::new("Image"));
        assert_eq!(nested.name(), "Image");
    }

    #[test]
    fn test_constraint_description() {
        assert_eq!(Constraint::Gt(0.0).describe(), "greater than 0");
        assert_eq!(Constraint::Le(2.5).describe(), "less than or equal to 2.5");
        assert_eq!(Constraint::Gt(0.0).kind(), "greater_than");
    }
}
