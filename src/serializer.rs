//! Rendering a document as YAML or JSON text and writing it out.

use crate::openapi_builder::OpenApiDocument;
use anyhow::{Context, Result};
use clap::ValueEnum;
use log::debug;
use std::fs;
use std::path::Path;

/// Text encodings a document can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

impl OutputFormat {
    /// Picks the format from a file extension, `None` when it names neither.
    pub fn from_extension(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Some(OutputFormat::Yaml),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Serializes a document to YAML.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_yaml(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to YAML");
    serde_yaml::to_string(doc).context("Failed to serialize OpenAPI document to YAML")
}

/// Serializes a document to pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_json(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to JSON");
    serde_json::to_string_pretty(doc).context("Failed to serialize OpenAPI document to JSON")
}

pub fn serialize(doc: &OpenApiDocument, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => serialize_yaml(doc),
        OutputFormat::Json => serialize_json(doc),
    }
}

/// Writes string content to a file, creating parent directories as needed.
///
/// # Arguments
///
/// * `content` - The string content to write
/// * `path` - The file path to write to
///
/// # Errors
///
/// Returns an error if a directory or the file cannot be created or written to.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interceptor::{describe_route, RouteDoc};
    use crate::openapi_builder::OpenApiBuilder;
    use crate::route::{HttpMethod, Route};
    use crate::validation::SchemaNode;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample_document() -> OpenApiDocument {
        let routes = vec![
            Route::new(HttpMethod::Get, "/health"),
            describe_route(
                HttpMethod::Post,
                "/orders",
                Some(
                    &RouteDoc::new()
                        .summary("Place an order")
                        .body(SchemaNode::object([
                            ("sku", SchemaNode::string().min_length(3)),
                            ("quantity", SchemaNode::integer().min(1).default_value(1)),
                        ]))
                        .response("201", "Created"),
                ),
            ),
            describe_route(HttpMethod::Get, "/orders/:id", None),
        ];
        OpenApiBuilder::new()
            .with_info(
                "Orders".to_string(),
                "0.3.0".to_string(),
                Some("Order service".to_string()),
            )
            .render(&routes)
    }

    #[test]
    fn test_serialize_yaml() {
        let yaml = serialize_yaml(&sample_document()).unwrap();

        assert!(yaml.contains("openapi: 3.0.3"));
        assert!(yaml.contains("title: Orders"));
        assert!(yaml.contains("/orders/{id}"));
        assert!(yaml.contains("operationId: get_orders_by_id"));
    }

    #[test]
    fn test_serialize_json_is_pretty() {
        let json = serialize_json(&sample_document()).unwrap();

        assert!(json.contains("\"openapi\": \"3.0.3\""));
        assert!(json.contains('\n'));
        assert!(json.contains("  "));
    }

    #[test]
    fn test_json_and_yaml_decode_to_the_same_value() {
        let doc = sample_document();

        let from_json: serde_json::Value =
            serde_json::from_str(&serialize(&doc, OutputFormat::Json).unwrap()).unwrap();
        let from_yaml: serde_json::Value =
            serde_yaml::from_str(&serialize(&doc, OutputFormat::Yaml).unwrap()).unwrap();

        assert_eq!(from_json, from_yaml);
    }

    #[test]
    fn test_roundtrip_json() {
        let doc = sample_document();

        let decoded: OpenApiDocument = serde_json::from_str(&serialize_json(&doc).unwrap()).unwrap();

        assert_eq!(decoded, doc);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            OutputFormat::from_extension(Path::new("api.YML")),
            Some(OutputFormat::Yaml)
        );
        assert_eq!(
            OutputFormat::from_extension(Path::new("out/api.json")),
            Some(OutputFormat::Json)
        );
        assert_eq!(OutputFormat::from_extension(Path::new("api.txt")), None);
        assert_eq!(OutputFormat::from_extension(Path::new("api")), None);
    }

    #[test]
    fn test_write_to_file_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/dir/openapi.yaml");

        write_to_file("openapi: 3.0.3\n", &path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "openapi: 3.0.3\n");
    }

    #[test]
    fn test_write_to_file_overwrites_existing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("openapi.json");
        fs::write(&path, "old content that is longer").unwrap();

        write_to_file("{}", &path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
    }
}
