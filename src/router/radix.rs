//! Radix tree implementation for HTTP route matching
//!
//! Each node represents one path segment:
//! - Static segments (e.g. `admin`) match exactly
//! - Parameter segments (e.g. `{name}`) match any single segment
//! - Typed parameter segments (e.g. `{id:int}`) match only segments their
//!   convertor accepts
//!
//! At every depth static children are tried before parameter children, so
//! `/user/admin` wins over `/user/{name}` whatever the registration order.
//! Parameter children at the same depth are tried in registration order, and
//! the search backtracks when a branch dead-ends.

use http::Method;
use std::sync::Arc;

use super::core::ParamVec;
use super::error::RouterError;
use super::meta::{ParamType, RouteMeta};

/// Segment convertor from a `{name:convertor}` template segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convertor {
    /// `{name}` or `{name:str}`: any non-empty segment
    Str,
    /// `{name:int}`: ASCII digits only
    Int,
}

impl Convertor {
    fn accepts(self, segment: &str) -> bool {
        match self {
            Convertor::Str => !segment.is_empty(),
            Convertor::Int => !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()),
        }
    }

    /// Parameter type implied by the convertor when the route does not declare one.
    pub fn implied_type(self) -> ParamType {
        match self {
            Convertor::Str => ParamType::String,
            Convertor::Int => ParamType::Integer,
        }
    }
}

/// One parsed segment of a path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Static(String),
    Param { name: String, convertor: Convertor },
}

/// Split a path template into segments.
///
/// Empty segments are ignored, so `/addproduct/` and `/addproduct` are the same
/// template.
pub fn parse_template(template: &str) -> Result<Vec<Segment>, RouterError> {
    let invalid = |reason: &str| RouterError::InvalidTemplate {
        template: template.to_string(),
        reason: reason.to_string(),
    };

    if !template.starts_with('/') {
        return Err(invalid("template must start with '/'"));
    }

    let mut segments = Vec::new();
    for raw in template.split('/').filter(|s| !s.is_empty()) {
        if raw.starts_with('{') && raw.ends_with('}') && raw.len() >= 2 {
            let inner = &raw[1..raw.len() - 1];
            let (name, convertor) = match inner.split_once(':') {
                Some((name, "int")) => (name, Convertor::Int),
                Some((name, "str")) => (name, Convertor::Str),
                Some((_, other)) => {
                    return Err(invalid(&format!("unknown convertor '{other}'")));
                }
                None => (inner, Convertor::Str),
            };
            if name.is_empty() {
                return Err(invalid("empty parameter name"));
            }
            if segments
                .iter()
                .any(|s| matches!(s, Segment::Param { name: n, .. } if n == name))
            {
                return Err(invalid(&format!("parameter '{name}' appears twice")));
            }
            segments.push(Segment::Param {
                name: name.to_string(),
                convertor,
            });
        } else if raw.contains('{') || raw.contains('}') {
            return Err(invalid(&format!("malformed segment '{raw}'")));
        } else {
            segments.push(Segment::Static(raw.to_string()));
        }
    }
    Ok(segments)
}

/// Canonical string form of a parsed template, used for duplicate detection.
pub fn canonical_template(segments: &[Segment]) -> String {
    if segments.is_empty() {
        return "/".to_string();
    }
    let mut out = String::new();
    for segment in segments {
        out.push('/');
        match segment {
            Segment::Static(s) => out.push_str(s),
            Segment::Param { name, convertor } => {
                out.push('{');
                out.push_str(name);
                if *convertor == Convertor::Int {
                    out.push_str(":int");
                }
                out.push('}');
            }
        }
    }
    out
}

#[derive(Clone)]
struct RadixNode {
    /// Static segment text; empty for parameter nodes
    segment: String,
    /// Routes terminating at this node, in registration order
    routes: Vec<(Method, Arc<RouteMeta>)>,
    /// Parameter name and convertor if this is a parameter node
    param: Option<(Arc<str>, Convertor)>,
    children: Vec<RadixNode>,
    param_children: Vec<RadixNode>,
}

impl RadixNode {
    fn new(segment: &str) -> Self {
        Self {
            segment: segment.to_string(),
            routes: Vec::new(),
            param: None,
            children: Vec::new(),
            param_children: Vec::new(),
        }
    }

    fn new_param(name: &str, convertor: Convertor) -> Self {
        Self {
            segment: String::new(),
            routes: Vec::new(),
            param: Some((Arc::from(name), convertor)),
            children: Vec::new(),
            param_children: Vec::new(),
        }
    }

    fn insert(&mut self, segments: &[Segment], method: Method, route: Arc<RouteMeta>) {
        let Some((segment, remaining)) = segments.split_first() else {
            self.routes.push((method, route));
            return;
        };

        match segment {
            Segment::Param { name, convertor } => {
                if let Some(child) = self.param_children.iter_mut().find(|c| {
                    c.param
                        .as_ref()
                        .is_some_and(|(n, cv)| n.as_ref() == name.as_str() && cv == convertor)
                }) {
                    child.insert(remaining, method, route);
                    return;
                }
                let mut child = RadixNode::new_param(name, *convertor);
                child.insert(remaining, method, route);
                self.param_children.push(child);
            }
            Segment::Static(text) => {
                if let Some(child) = self.children.iter_mut().find(|c| &c.segment == text) {
                    child.insert(remaining, method, route);
                    return;
                }
                let mut child = RadixNode::new(text);
                child.insert(remaining, method, route);
                self.children.push(child);
            }
        }
    }

    fn search(
        &self,
        segments: &[&str],
        method: &Method,
        params: &mut ParamVec,
    ) -> Option<Arc<RouteMeta>> {
        let Some((segment, remaining)) = segments.split_first() else {
            return self
                .routes
                .iter()
                .find(|(m, _)| m == method)
                .map(|(_, route)| Arc::clone(route));
        };

        for child in &self.children {
            if child.segment == *segment {
                if let Some(route) = child.search(remaining, method, params) {
                    return Some(route);
                }
            }
        }

        for child in &self.param_children {
            if let Some((name, convertor)) = &child.param {
                if !convertor.accepts(segment) {
                    continue;
                }
                params.push((Arc::clone(name), (*segment).to_string()));
                if let Some(route) = child.search(remaining, method, params) {
                    return Some(route);
                }
                // Backtrack: this branch did not lead to a route
                params.pop();
            }
        }

        None
    }
}

/// Radix tree keyed by path segments, with per-node method tables.
#[derive(Clone)]
pub struct RadixRouter {
    root: RadixNode,
}

impl Default for RadixRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl RadixRouter {
    pub fn new() -> Self {
        Self {
            root: RadixNode::new(""),
        }
    }

    pub fn insert(&mut self, segments: &[Segment], route: Arc<RouteMeta>) {
        let method = route.method.clone();
        self.root.insert(segments, method, route);
    }

    /// Look up a decoded request path. Segments must already be percent-decoded.
    pub fn route(&self, method: &Method, segments: &[&str]) -> Option<(Arc<RouteMeta>, ParamVec)> {
        let mut params = ParamVec::new();
        self.root
            .search(segments, method, &mut params)
            .map(|route| (route, params))
    }
}
