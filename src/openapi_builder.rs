use crate::config::{Contact, DocsConfig, License, Server};
use crate::route::{
    default_summary, derive_tag, normalize_path, path_parameters, HttpMethod, MediaType, Parameter,
    ParameterLocation, Response, Route,
};
use crate::schema_converter::SchemaFragment;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Value of the `openapi` key of every rendered document.
pub const OPENAPI_VERSION: &str = "3.0.3";

/// OpenAPI document builder
///
/// Rendering is a pure function of the route snapshot and the builder settings:
/// the same snapshot always yields an equal document.
#[derive(Debug, Clone)]
pub struct OpenApiBuilder {
    /// OpenAPI info section
    info: Info,
    servers: Vec<Server>,
    /// Normalized path prefixes left out of the document
    exclusions: Vec<String>,
}

/// OpenAPI Info object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
    /// API description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
}

impl Default for Info {
    fn default() -> Self {
        Self {
            title: "Generated API".to_string(),
            version: "1.0.0".to_string(),
            description: Some("API documentation generated from discovered routes".to_string()),
            contact: None,
            license: None,
        }
    }
}

/// OpenAPI PathItem object (operations for a single path)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
}

impl PathItem {
    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
        }
    }

    pub fn set_operation(&mut self, method: HttpMethod, operation: Operation) {
        let slot = match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Patch => &mut self.patch,
            HttpMethod::Head => &mut self.head,
            HttpMethod::Options => &mut self.options,
        };
        *slot = Some(operation);
    }
}

/// OpenAPI Operation object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "operationId")]
    pub operation_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    pub responses: BTreeMap<String, Response>,
}

/// OpenAPI RequestBody object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    pub required: bool,
    pub content: BTreeMap<String, MediaType>,
}

/// Complete OpenAPI document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// OpenAPI version
    pub openapi: String,
    /// API info
    pub info: Info,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    /// API paths, sorted
    pub paths: BTreeMap<String, PathItem>,
}

impl OpenApiBuilder {
    /// Create a new OpenApiBuilder with default info
    pub fn new() -> Self {
        Self {
            info: Info::default(),
            servers: Vec::new(),
            exclusions: Vec::new(),
        }
    }

    /// Builder whose info, servers and exclusions come from `config`.
    ///
    /// Each info field falls back to its default when not configured.
    pub fn from_config(config: &DocsConfig) -> Self {
        let defaults = Info::default();
        Self {
            info: Info {
                title: config.title.clone().unwrap_or(defaults.title),
                version: config.version.clone().unwrap_or(defaults.version),
                description: config.description.clone().or(defaults.description),
                contact: config.contact.clone(),
                license: config.license.clone(),
            },
            servers: config.servers.clone(),
            exclusions: config
                .exclusion_prefixes()
                .iter()
                .map(|p| normalize_path(p))
                .collect(),
        }
    }

    /// Set custom info for the API
    pub fn with_info(mut self, title: String, version: String, description: Option<String>) -> Self {
        self.info.title = title;
        self.info.version = version;
        self.info.description = description;
        self
    }

    /// Renders a route snapshot.
    pub fn render(&self, routes: &[Route]) -> OpenApiDocument {
        let mut paths: BTreeMap<String, PathItem> = BTreeMap::new();

        for route in routes {
            if self.is_excluded(&route.path) {
                debug!("Leaving excluded {} {} out of the document", route.method, route.path);
                continue;
            }
            paths
                .entry(route.path.clone())
                .or_default()
                .set_operation(route.method, build_operation(route));
        }

        debug!("Rendered {} paths from {} routes", paths.len(), routes.len());

        OpenApiDocument {
            openapi: OPENAPI_VERSION.to_string(),
            info: self.info.clone(),
            servers: self.servers.clone(),
            paths,
        }
    }

    fn is_excluded(&self, path: &str) -> bool {
        self.exclusions.iter().any(|prefix| {
            prefix == "/"
                || path
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
    }
}

impl Default for OpenApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders `routes` with the settings of `config`.
pub fn render(routes: &[Route], config: &DocsConfig) -> OpenApiDocument {
    OpenApiBuilder::from_config(config).render(routes)
}

fn build_operation(route: &Route) -> Operation {
    // Path parameters follow placeholder order; undescribed ones are required strings
    let mut parameters: Vec<Parameter> = path_parameters(&route.path)
        .into_iter()
        .map(|default| {
            route
                .parameters
                .iter()
                .find(|p| p.name == default.name && p.location == ParameterLocation::Path)
                .cloned()
                .unwrap_or(default)
        })
        .collect();
    parameters.extend(
        route
            .parameters
            .iter()
            .filter(|p| p.location != ParameterLocation::Path)
            .cloned(),
    );

    let request_body = route.method.carries_body().then(|| {
        let schema = route
            .request_body
            .clone()
            .unwrap_or_else(SchemaFragment::object);
        RequestBody {
            required: true,
            content: BTreeMap::from([("application/json".to_string(), MediaType { schema })]),
        }
    });

    let responses = if route.responses.is_empty() {
        BTreeMap::from([("200".to_string(), Response::new("Successful response"))])
    } else {
        route.responses.clone()
    };

    let tags = if route.tags.is_empty() {
        vec![derive_tag(&route.path)]
    } else {
        route.tags.clone()
    };

    Operation {
        tags,
        summary: route
            .summary
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| default_summary(route.method, &route.path)),
        description: route.description.clone(),
        operation_id: operation_id(route.method, &route.path),
        parameters,
        request_body,
        responses,
    }
}

/// `get_users_by_id` for `GET /users/{id}`.
pub fn operation_id(method: HttpMethod, path: &str) -> String {
    let mut parts = vec![method.as_str().to_string()];
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        let part = match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(name) => format!("by_{}", name),
            None => segment.to_string(),
        };
        let cleaned: String = part
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();
        parts.push(cleaned);
    }
    if parts.len() == 1 {
        parts.push("root".to_string());
    }
    parts.join("_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::SchemaNode;
    use crate::interceptor::{describe_route, RouteDoc};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_empty_snapshot() {
        let doc = OpenApiBuilder::new().render(&[]);

        assert_eq!(doc.openapi, "3.0.3");
        assert_eq!(doc.info.title, "Generated API");
        assert_eq!(doc.info.version, "1.0.0");
        assert!(doc.paths.is_empty());
        assert!(doc.servers.is_empty());
    }

    #[test]
    fn test_bare_routes_get_defaults() {
        let routes = vec![
            Route::new(HttpMethod::Get, "/"),
            Route::new(HttpMethod::Post, "/items"),
        ];

        let value = serde_json::to_value(OpenApiBuilder::new().render(&routes)).unwrap();

        assert_eq!(
            value["paths"],
            json!({
                "/": {
                    "get": {
                        "tags": ["default"],
                        "summary": "GET /",
                        "operationId": "get_root",
                        "responses": {"200": {"description": "Successful response"}}
                    }
                },
                "/items": {
                    "post": {
                        "tags": ["items"],
                        "summary": "POST /items",
                        "operationId": "post_items",
                        "requestBody": {
                            "required": true,
                            "content": {"application/json": {"schema": {"type": "object"}}}
                        },
                        "responses": {"200": {"description": "Successful response"}}
                    }
                }
            })
        );
    }

    #[test]
    fn test_missing_path_parameters_are_filled_in() {
        let doc = OpenApiBuilder::new().render(&[Route::new(HttpMethod::Delete, "/users/:id")]);

        let operation = doc.paths["/users/{id}"].operation(HttpMethod::Delete).unwrap();
        assert_eq!(operation.operation_id, "delete_users_by_id");
        assert_eq!(operation.parameters, vec![Parameter::path("id")]);
        assert!(operation.request_body.is_none());
    }

    #[test]
    fn test_runtime_and_static_routes_render_alike() {
        let bare = OpenApiBuilder::new().render(&[Route::new(HttpMethod::Get, "/api/v1/users/:id")]);
        let observed = OpenApiBuilder::new().render(&[describe_route(
            HttpMethod::Get,
            "/api/v1/users/:id",
            None,
        )]);

        assert_eq!(bare, observed);
        let operation = bare.paths["/api/v1/users/{id}"].get.as_ref().unwrap();
        assert_eq!(operation.tags, vec!["users".to_string()]);
        assert_eq!(operation.summary, "GET /api/v1/users/{id}");
        assert_eq!(operation.parameters, vec![Parameter::path("id")]);
    }

    #[test]
    fn test_documented_route() {
        let route = describe_route(
            HttpMethod::Post,
            "/users",
            Some(
                &RouteDoc::new()
                    .summary("Create a user")
                    .body(SchemaNode::object([("email", SchemaNode::string().email())]))
                    .response("201", "Created"),
            ),
        );

        let doc = OpenApiBuilder::new().render(&[route]);
        let operation = doc.paths["/users"].post.as_ref().unwrap();

        assert_eq!(operation.summary, "Create a user");
        assert_eq!(operation.tags, vec!["users".to_string()]);
        assert_eq!(operation.responses.keys().collect::<Vec<_>>(), vec!["201"]);
        assert_eq!(
            serde_json::to_value(&operation.request_body).unwrap()["content"]["application/json"]
                ["schema"],
            json!({
                "type": "object",
                "properties": {"email": {"type": "string", "format": "email"}},
                "required": ["email"]
            })
        );
    }

    #[test]
    fn test_config_overrides_info_and_excludes() {
        let config = DocsConfig {
            title: Some("Shop".to_string()),
            servers: vec![Server {
                url: "https://shop.example.com".to_string(),
                description: None,
            }],
            exclude: vec!["/internal".to_string()],
            ..DocsConfig::default()
        };
        let routes = vec![
            Route::new(HttpMethod::Get, "/products"),
            Route::new(HttpMethod::Get, "/internal/metrics"),
            Route::new(HttpMethod::Get, "/docs/openapi.json"),
        ];

        let doc = render(&routes, &config);

        assert_eq!(doc.info.title, "Shop");
        assert_eq!(doc.info.version, "1.0.0");
        assert_eq!(doc.servers.len(), 1);
        assert_eq!(doc.paths.keys().collect::<Vec<_>>(), vec!["/products"]);
    }

    #[test]
    fn test_render_is_deterministic() {
        let routes = vec![
            Route::new(HttpMethod::Get, "/b"),
            Route::new(HttpMethod::Get, "/a"),
            Route::new(HttpMethod::Put, "/a"),
        ];
        let builder = OpenApiBuilder::new();

        assert_eq!(builder.render(&routes), builder.render(&routes));
        assert_eq!(
            builder.render(&routes).paths.keys().collect::<Vec<_>>(),
            vec!["/a", "/b"]
        );
    }

    #[test]
    fn test_operation_id() {
        assert_eq!(operation_id(HttpMethod::Get, "/"), "get_root");
        assert_eq!(
            operation_id(HttpMethod::Patch, "/api/v1/order-items/{item_id}"),
            "patch_api_v1_order_items_by_item_id"
        );
    }
}
