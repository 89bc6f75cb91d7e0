//! OpenAPI documents from the routes an application actually registers.
//!
//! Routes are discovered two ways and merged into one registry:
//!
//! - statically, by scanning source files for router declarations and the
//!   route calls made on them ([`extractor::StaticScanner`])
//! - at runtime, by registering routes through an intercepting proxy that
//!   reports each registration before delegating ([`interceptor::Intercepted`])
//!
//! Request schemas attached to routes are validation-schema graphs
//! ([`validation::SchemaNode`]) converted into JSON-Schema fragments by
//! [`schema_converter`]. The registry snapshot is rendered into an OpenAPI 3
//! document by [`openapi_builder`].
//!
//! # Modules
//!
//! 1. [`scanner`] - Walks project directories for candidate source files
//! 2. [`extractor`] - Finds router declarations and route calls in source text
//! 3. [`interceptor`] - Runtime proxy reporting every registration
//! 4. [`route_table`] - A small router usable behind the proxy
//! 5. [`registry`] - Deduplicating, merging route store
//! 6. [`schema_converter`] - Validation schemas to schema fragments
//! 7. [`openapi_builder`] - Assembles the document
//! 8. [`docs`] - The object applications hold: intercept, rescan, render, serve
//! 9. [`config`] and [`serializer`] - Settings in, YAML/JSON out
//!
//! # Example Usage
//!
//! ```no_run
//! use openapi_from_routes::config::DocsConfig;
//! use openapi_from_routes::docs::ApiDocs;
//! use openapi_from_routes::interceptor::{docs, RouteDoc, Step};
//! use openapi_from_routes::route_table::RouteTable;
//! use openapi_from_routes::validation::SchemaNode;
//! use std::path::Path;
//!
//! fn create_user() {}
//!
//! let api_docs = ApiDocs::new(DocsConfig::default());
//!
//! let mut app = api_docs.intercept(RouteTable::new());
//! app.post(
//!     "/users",
//!     [
//!         docs(RouteDoc::new().body(SchemaNode::object([
//!             ("email", SchemaNode::string().email()),
//!         ]))),
//!         Step::Handler(create_user as fn()),
//!     ],
//! );
//!
//! api_docs.rescan(Path::new("./src"));
//! println!("{}", api_docs.document_yaml().unwrap());
//! ```

pub mod cli;
pub mod config;
pub mod docs;
pub mod error;
pub mod extractor;
pub mod interceptor;
pub mod openapi_builder;
pub mod registry;
pub mod route;
pub mod route_table;
pub mod scanner;
pub mod schema_converter;
pub mod serializer;
pub mod validation;
