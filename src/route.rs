//! Route data model shared by every discovery source.
//!
//! A [`Route`] is one `(method, normalized path)` endpoint with its documentation
//! metadata. Both the static scanner and the runtime interceptor produce routes
//! whose paths went through [`normalize_path`], so the same endpoint found by
//! either source lands on the same registry key.

use crate::error::Error;
use crate::schema_converter::SchemaFragment;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// HTTP methods a route can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpMethod {
    /// All supported methods, in document order.
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
        HttpMethod::Head,
        HttpMethod::Options,
    ];

    /// Lowercase name, as used for document keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
            HttpMethod::Head => "head",
            HttpMethod::Options => "options",
        }
    }

    /// Whether requests with this method conventionally carry a body.
    pub fn carries_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

impl FromStr for HttpMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "get" => Ok(HttpMethod::Get),
            "post" => Ok(HttpMethod::Post),
            "put" => Ok(HttpMethod::Put),
            "delete" => Ok(HttpMethod::Delete),
            "patch" => Ok(HttpMethod::Patch),
            "head" => Ok(HttpMethod::Head),
            "options" => Ok(HttpMethod::Options),
            other => Err(Error::InvalidArgument(format!(
                "unknown HTTP method: {}",
                other
            ))),
        }
    }
}

/// The location a parameter value is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// Placeholder segment of the path (e.g. `/users/{id}`)
    Path,
    /// Query string parameter (e.g. `?page=1`)
    Query,
}

/// A single route parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    pub required: bool,
    pub schema: SchemaFragment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Parameter {
    /// A required path parameter with a string schema.
    pub fn path(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: ParameterLocation::Path,
            required: true,
            schema: SchemaFragment::of_type("string"),
            description: None,
        }
    }

    pub fn query(name: impl Into<String>, required: bool, schema: SchemaFragment) -> Self {
        Self {
            name: name.into(),
            location: ParameterLocation::Query,
            required,
            schema,
            description: None,
        }
    }
}

/// Content of a request or response for one media type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    pub schema: SchemaFragment,
}

/// A documented response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<BTreeMap<String, MediaType>>,
}

impl Response {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            content: None,
        }
    }

    /// A response with an `application/json` body.
    pub fn json(description: impl Into<String>, schema: SchemaFragment) -> Self {
        let mut content = BTreeMap::new();
        content.insert("application/json".to_string(), MediaType { schema });
        Self {
            description: description.into(),
            content: Some(content),
        }
    }
}

/// One discovered endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub method: HttpMethod,
    /// Normalized path template (`/users/{id}`)
    pub path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(rename = "requestBody", default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<SchemaFragment>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub responses: BTreeMap<String, Response>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Route {
    /// Creates a bare route; the path is normalized.
    pub fn new(method: HttpMethod, path: &str) -> Self {
        Self {
            method,
            path: normalize_path(path),
            parameters: Vec::new(),
            request_body: None,
            responses: BTreeMap::new(),
            tags: Vec::new(),
            summary: None,
            description: None,
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a tag unless it is already present.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_request_body(mut self, schema: SchemaFragment) -> Self {
        self.request_body = Some(schema);
        self
    }

    pub fn with_response(mut self, status: impl Into<String>, response: Response) -> Self {
        self.responses.insert(status.into(), response);
        self
    }

    /// Registry key of this route.
    pub fn key(&self) -> (HttpMethod, String) {
        (self.method, self.path.clone())
    }

    /// Merges a later observation of the same endpoint into this one.
    ///
    /// Present values of `incoming` override; absent or empty ones leave the
    /// existing value in place. Parameters merge by `(name, location)`.
    pub fn merge_from(&mut self, incoming: Route) {
        for parameter in incoming.parameters {
            match self
                .parameters
                .iter_mut()
                .find(|p| p.name == parameter.name && p.location == parameter.location)
            {
                Some(existing) => *existing = parameter,
                None => self.parameters.push(parameter),
            }
        }
        if incoming.request_body.is_some() {
            self.request_body = incoming.request_body;
        }
        if !incoming.responses.is_empty() {
            self.responses = incoming.responses;
        }
        if !incoming.tags.is_empty() {
            self.tags = incoming.tags;
        }
        if incoming.summary.as_deref().is_some_and(|s| !s.is_empty()) {
            self.summary = incoming.summary;
        }
        if incoming.description.as_deref().is_some_and(|s| !s.is_empty()) {
            self.description = incoming.description;
        }
    }
}

/// Rewrites a framework path into the canonical placeholder form.
///
/// `:id`, `{id}`, `*rest` and `{*rest}` segments all become `{name}`; duplicate
/// slashes collapse and trailing slashes are stripped, except for `/` itself.
pub fn normalize_path(path: &str) -> String {
    let segments: Vec<String> = path
        .trim()
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(normalize_segment)
        .collect();

    format!("/{}", segments.join("/"))
}

fn normalize_segment(segment: &str) -> String {
    let name = if let Some(rest) = segment.strip_prefix(':') {
        Some(rest.trim_end_matches('?'))
    } else if let Some(rest) = segment.strip_prefix('*') {
        Some(rest)
    } else if let Some(inner) = segment.strip_prefix("{*").and_then(|s| s.strip_suffix('}')) {
        Some(inner)
    } else {
        None
    };

    match name {
        Some(name) if is_identifier(name) => format!("{{{}}}", name),
        _ => segment.to_string(),
    }
}

/// Combines a mount prefix and a path, handling slashes on both sides.
pub fn join_paths(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    let joined = if path.is_empty() {
        prefix.to_string()
    } else {
        format!("{}/{}", prefix, path)
    };

    normalize_path(&joined)
}

/// Names of the `{name}` placeholders of a normalized path, in order.
pub fn placeholder_names(path: &str) -> Vec<String> {
    path.split('/')
        .filter_map(|segment| segment.strip_prefix('{')?.strip_suffix('}'))
        .filter(|name| is_identifier(name))
        .map(str::to_string)
        .collect()
}

/// Default path parameters for every placeholder of `path`.
pub fn path_parameters(path: &str) -> Vec<Parameter> {
    placeholder_names(path).into_iter().map(Parameter::path).collect()
}

/// Tag derived from the first meaningful segment of a normalized path.
///
/// Placeholders, an `api` segment and version markers (`v1`, `v2`, ...) are
/// skipped; `default` is used when nothing qualifies.
pub fn derive_tag(path: &str) -> String {
    path.split('/')
        .find(|segment| {
            !segment.is_empty()
                && !segment.starts_with('{')
                && !segment.eq_ignore_ascii_case("api")
                && !is_version_marker(segment)
        })
        .unwrap_or("default")
        .to_string()
}

/// Summary used for routes nobody described: `"GET /users/{id}"`.
pub fn default_summary(method: HttpMethod, path: &str) -> String {
    format!("{} {}", method, path)
}

fn is_version_marker(segment: &str) -> bool {
    let mut chars = segment.chars();
    matches!(chars.next(), Some('v') | Some('V'))
        && segment.len() > 1
        && chars.all(|c| c.is_ascii_digit())
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_')
}
