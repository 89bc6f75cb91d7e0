//! Documentation settings.
//!
//! A [`DocsConfig`] is read from a YAML or JSON file (picked by extension) and
//! every field is optional. The command line overlays its flags on top of it.
//!
//! ```yaml
//! title: Inventory API
//! version: 2.1.0
//! servers:
//!   - url: https://inventory.example.com
//! exclude: [/internal]
//! routes:
//!   - method: post
//!     path: /items
//!     summary: Create an item
//!     request_schema:
//!       kind: object
//!       fields:
//!         - name: title
//!           schema: {kind: string}
//! ```

use crate::error::{Error, Result};
use crate::interceptor::{describe_route, RouteDoc};
use crate::route::{join_paths, HttpMethod, Route};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    pub title: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub contact: Option<Contact>,
    pub license: Option<License>,
    pub servers: Vec<Server>,
    /// Base path of the documentation endpoints, never documented itself
    pub docs_path: String,
    /// Path prefixes left out of the document
    pub exclude: Vec<String>,
    /// Source file extensions the static scan reads
    pub extensions: Vec<String>,
    /// Routes registered by hand
    pub routes: Vec<ManualRoute>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct License {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// An entry of the manual route manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualRoute {
    pub method: HttpMethod,
    pub path: String,
    #[serde(flatten)]
    pub doc: RouteDoc,
}

impl ManualRoute {
    pub fn to_route(&self) -> Route {
        describe_route(self.method, &self.path, Some(&self.doc))
    }
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            title: None,
            version: None,
            description: None,
            contact: None,
            license: None,
            servers: Vec::new(),
            docs_path: "/docs".to_string(),
            exclude: Vec::new(),
            extensions: vec!["rs".to_string()],
            routes: Vec::new(),
        }
    }
}

impl DocsConfig {
    /// Loads a configuration file; `.json` files are read as JSON, anything else as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let config = if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
        .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))?;

        debug!(
            "Loaded configuration from {} ({} manual routes)",
            path.display(),
            config.routes.len()
        );
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(e.to_string()))
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::ConfigError(e.to_string()))
    }

    /// Configured exclusions plus the documentation path.
    pub fn exclusion_prefixes(&self) -> Vec<String> {
        let mut prefixes = self.exclude.clone();
        prefixes.push(self.docs_path.clone());
        prefixes
    }

    /// Path the JSON document is served from.
    pub fn spec_path(&self) -> String {
        join_paths(&self.docs_path, "openapi.json")
    }
}
