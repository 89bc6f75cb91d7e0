//! Runtime route discovery.
//!
//! Applications build an [`Intercepted`] proxy in place of their raw router.
//! Every registration made through the proxy is turned into a [`Route`] and
//! reported before the call reaches the wrapped [`RouteTarget`], so routes the
//! static scanner cannot see (chained builders, computed paths) still reach
//! the registry.
//!
//! ```
//! use openapi_from_routes::interceptor::{docs, Intercepted, RouteDoc, Step};
//! use openapi_from_routes::registry::RegistryHandle;
//! use openapi_from_routes::route_table::RouteTable;
//! use openapi_from_routes::validation::SchemaNode;
//!
//! fn show(_id: &str) {}
//!
//! let registry = RegistryHandle::default();
//!
//! let mut users = Intercepted::detached(RouteTable::new());
//! users.get(
//!     "/:id",
//!     [
//!         docs(RouteDoc::new().summary("Fetch a user")),
//!         Step::Handler(show as fn(&str)),
//!     ],
//! );
//!
//! let mut app = Intercepted::new(RouteTable::new(), registry.clone());
//! app.mount("/users", users);
//!
//! assert!(registry.lock().exists(openapi_from_routes::route::HttpMethod::Get, "/users/{id}"));
//! ```

use crate::error::Result;
use crate::registry::{DiscoverySource, RegistryHandle};
use crate::route::{join_paths, placeholder_names, HttpMethod, Parameter, Response, Route};
use crate::schema_converter::convert;
use crate::validation::SchemaNode;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The framework side of interception: anything routes can be registered on.
pub trait RouteTarget: Sized {
    /// Element type of a handler chain
    type Handler;

    /// Registers `chain` for `method` and `path`.
    fn register(&mut self, method: HttpMethod, path: &str, chain: Vec<Self::Handler>)
        -> Result<()>;

    /// Folds `child` in under `base`.
    fn mount(&mut self, base: &str, child: Self) -> Result<()>;
}

/// A handler chain element that may carry route documentation.
pub trait Documented {
    fn route_doc(&self) -> Option<&RouteDoc>;
}

/// Documentation attached to a route by the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteDoc {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(alias = "request_schema", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<SchemaNode>,
    /// An object schema, one query parameter per field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<SchemaNode>,
    /// Schemas replacing the default string schema of path parameters
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, SchemaNode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub responses: Vec<DocResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocResponse {
    pub status: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaNode>,
}

impl RouteDoc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn body(mut self, schema: SchemaNode) -> Self {
        self.request_body = Some(schema);
        self
    }

    pub fn query(mut self, schema: SchemaNode) -> Self {
        self.query = Some(schema);
        self
    }

    pub fn param(mut self, name: impl Into<String>, schema: SchemaNode) -> Self {
        self.params.insert(name.into(), schema);
        self
    }

    pub fn response(mut self, status: impl Into<String>, description: impl Into<String>) -> Self {
        self.responses.push(DocResponse {
            status: status.into(),
            description: description.into(),
            schema: None,
        });
        self
    }

    pub fn response_with(
        mut self,
        status: impl Into<String>,
        description: impl Into<String>,
        schema: SchemaNode,
    ) -> Self {
        self.responses.push(DocResponse {
            status: status.into(),
            description: description.into(),
            schema: Some(schema),
        });
        self
    }
}

/// A ready-made chain element: either documentation or a real handler.
#[derive(Debug, Clone)]
pub enum Step<H> {
    Doc(RouteDoc),
    Handler(H),
}

impl<H> Documented for Step<H> {
    fn route_doc(&self) -> Option<&RouteDoc> {
        match self {
            Step::Doc(doc) => Some(doc),
            Step::Handler(_) => None,
        }
    }
}

/// Documentation step for a handler chain.
pub fn docs<H>(doc: RouteDoc) -> Step<H> {
    Step::Doc(doc)
}

/// Builds the route reported for one registration.
///
/// Only what `doc` supplies is recorded: path parameters with a schema
/// override, query parameters, body, responses, tags and summary. Defaults for
/// the rest are added when the document is rendered, so a bare registration
/// never overwrites documentation another source already gave the route.
pub fn describe_route(method: HttpMethod, path: &str, doc: Option<&RouteDoc>) -> Route {
    let mut route = Route::new(method, path);
    let Some(doc) = doc else {
        return route;
    };

    route.parameters = placeholder_names(&route.path)
        .into_iter()
        .filter_map(|name| {
            let schema = doc.params.get(&name)?;
            Some(Parameter {
                schema: convert(schema),
                ..Parameter::path(name)
            })
        })
        .collect();

    match &doc.query {
        Some(SchemaNode::Object { fields }) => {
            route.parameters.extend(
                fields
                    .iter()
                    .map(|f| Parameter::query(&f.name, !f.schema.is_optional(), convert(&f.schema))),
            );
        }
        Some(other) => warn!(
            "Query schema of {} {} is a {}, not an object; ignoring it",
            method,
            route.path,
            other.kind_name()
        ),
        None => {}
    }

    if method.carries_body() {
        route.request_body = doc.request_body.as_ref().map(convert);
    }

    for response in &doc.responses {
        let rendered = match &response.schema {
            Some(schema) => Response::json(&response.description, convert(schema)),
            None => Response::new(&response.description),
        };
        route.responses.insert(response.status.clone(), rendered);
    }

    route.tags = doc.tags.clone();
    route.summary = doc.summary.clone();
    route.description = doc.description.clone();

    route
}

/// A registration seen by a detached proxy, waiting for its mount prefix.
#[derive(Debug, Clone)]
pub struct Observation {
    pub method: HttpMethod,
    /// Path relative to the proxy, as registered
    pub path: String,
    pub doc: Option<RouteDoc>,
}

#[derive(Debug)]
enum Sink {
    Registry(RegistryHandle),
    Buffer(Vec<Observation>),
}

/// A router proxy that reports every registration.
#[derive(Debug)]
pub struct Intercepted<T: RouteTarget> {
    target: T,
    sink: Sink,
}

impl<T> Intercepted<T>
where
    T: RouteTarget,
    T::Handler: Documented,
{
    /// Wraps a root router; registrations go straight to `registry`.
    pub fn new(target: T, registry: RegistryHandle) -> Self {
        Self {
            target,
            sink: Sink::Registry(registry),
        }
    }

    /// Wraps a sub-router; registrations are held until it is mounted.
    pub fn detached(target: T) -> Self {
        Self {
            target,
            sink: Sink::Buffer(Vec::new()),
        }
    }

    /// Observations waiting for a mount, empty for a root proxy.
    pub fn pending(&self) -> &[Observation] {
        match &self.sink {
            Sink::Buffer(observations) => observations,
            Sink::Registry(_) => &[],
        }
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    /// Registers `chain` for `method` and `path` on the wrapped router.
    pub fn route<I>(&mut self, method: HttpMethod, path: &str, chain: I) -> &mut Self
    where
        I: IntoIterator<Item = T::Handler>,
    {
        let chain: Vec<T::Handler> = chain.into_iter().collect();
        let doc = chain.iter().rev().find_map(|step| step.route_doc()).cloned();

        self.observe(Observation {
            method,
            path: path.to_string(),
            doc,
        });

        if let Err(e) = self.target.register(method, path, chain) {
            warn!("Router rejected {} {}: {}", method, path, e);
        }
        self
    }

    pub fn get<I>(&mut self, path: &str, chain: I) -> &mut Self
    where
        I: IntoIterator<Item = T::Handler>,
    {
        self.route(HttpMethod::Get, path, chain)
    }

    pub fn post<I>(&mut self, path: &str, chain: I) -> &mut Self
    where
        I: IntoIterator<Item = T::Handler>,
    {
        self.route(HttpMethod::Post, path, chain)
    }

    pub fn put<I>(&mut self, path: &str, chain: I) -> &mut Self
    where
        I: IntoIterator<Item = T::Handler>,
    {
        self.route(HttpMethod::Put, path, chain)
    }

    pub fn delete<I>(&mut self, path: &str, chain: I) -> &mut Self
    where
        I: IntoIterator<Item = T::Handler>,
    {
        self.route(HttpMethod::Delete, path, chain)
    }

    pub fn patch<I>(&mut self, path: &str, chain: I) -> &mut Self
    where
        I: IntoIterator<Item = T::Handler>,
    {
        self.route(HttpMethod::Patch, path, chain)
    }

    pub fn head<I>(&mut self, path: &str, chain: I) -> &mut Self
    where
        I: IntoIterator<Item = T::Handler>,
    {
        self.route(HttpMethod::Head, path, chain)
    }

    pub fn options<I>(&mut self, path: &str, chain: I) -> &mut Self
    where
        I: IntoIterator<Item = T::Handler>,
    {
        self.route(HttpMethod::Options, path, chain)
    }

    /// Mounts a detached proxy under `base`.
    ///
    /// The child's held observations are re-prefixed with `base` and reported
    /// through this proxy, so prefixes accumulate across nesting levels.
    pub fn mount(&mut self, base: &str, child: Intercepted<T>) -> &mut Self {
        let Intercepted { target, sink } = child;

        match sink {
            Sink::Buffer(observations) => {
                debug!("Mounting {} routes under {}", observations.len(), base);
                for observation in observations {
                    self.observe(Observation {
                        path: join_paths(base, &observation.path),
                        ..observation
                    });
                }
            }
            Sink::Registry(_) => warn!(
                "Mounted a root proxy under {}; its routes were already reported without the prefix",
                base
            ),
        }

        if let Err(e) = self.target.mount(base, target) {
            warn!("Router rejected mount at {}: {}", base, e);
        }
        self
    }

    fn observe(&mut self, observation: Observation) {
        match &mut self.sink {
            Sink::Registry(registry) => {
                let route =
                    describe_route(observation.method, &observation.path, observation.doc.as_ref());
                registry.upsert_from(DiscoverySource::Runtime, route);
            }
            Sink::Buffer(observations) => observations.push(observation),
        }
    }
}
