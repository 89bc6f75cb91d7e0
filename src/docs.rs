//! The documentation object applications hold on to.
//!
//! [`ApiDocs`] ties the pieces together: it owns the shared registry and the
//! configuration, hands out intercepting routers, drives static rescans, and
//! renders and serves the document.

use crate::config::DocsConfig;
use crate::error::{Error, Result};
use crate::extractor::StaticScanner;
use crate::interceptor::{Documented, Intercepted, RouteTarget};
use crate::openapi_builder::{OpenApiBuilder, OpenApiDocument};
use crate::registry::{DiscoverySource, RegistryHandle, RouteRegistry, UpsertOutcome};
use crate::route::{normalize_path, Route};
use crate::scanner::{FileScanner, SourceTree};
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Counts from one [`ApiDocs::rescan`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub files_scanned: usize,
    pub routers_found: usize,
    pub routes_upserted: usize,
    pub routes_pruned: usize,
    pub warnings: Vec<String>,
}

/// A change notification from a file watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    pub path: PathBuf,
    pub kind: FileEventKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileEventKind {
    Created,
    Modified,
    Removed,
}

pub struct ApiDocs<T: SourceTree = FileScanner> {
    registry: RegistryHandle,
    config: DocsConfig,
    scanner: StaticScanner<T>,
}

impl ApiDocs<FileScanner> {
    /// Documentation backed by the local disk, scanning the configured extensions.
    pub fn new(config: DocsConfig) -> Self {
        let tree = FileScanner::with_extensions(&config.extensions);
        Self::with_source_tree(config, tree)
    }
}

impl<T: SourceTree> ApiDocs<T> {
    pub fn with_source_tree(config: DocsConfig, tree: T) -> Self {
        let registry = RegistryHandle::new(RouteRegistry::with_exclusions(
            config.exclusion_prefixes(),
        ));
        Self {
            registry,
            config,
            scanner: StaticScanner::with_tree(tree),
        }
    }

    pub fn registry(&self) -> &RegistryHandle {
        &self.registry
    }

    pub fn config(&self) -> &DocsConfig {
        &self.config
    }

    /// Wraps `target` in a root proxy reporting to this documentation.
    pub fn intercept<R>(&self, target: R) -> Intercepted<R>
    where
        R: RouteTarget,
        R::Handler: Documented,
    {
        Intercepted::new(target, self.registry.clone())
    }

    /// Registers a route by hand.
    pub fn register(&self, route: Route) -> UpsertOutcome {
        self.registry.upsert_from(DiscoverySource::Manual, route)
    }

    /// Registers every route of the configuration's manual manifest.
    pub fn register_manifest(&self) -> usize {
        self.config
            .routes
            .iter()
            .map(|manual| self.register(manual.to_route()))
            .filter(|outcome| *outcome != UpsertOutcome::Excluded)
            .count()
    }

    /// Scans `root` statically and brings the registry up to date.
    ///
    /// Static routes no longer found are pruned unless another source also
    /// reported them.
    pub fn rescan(&self, root: &Path) -> ScanSummary {
        let generation = self.registry.lock().begin_scan();
        let report = self.scanner.scan_report(root);

        let mut summary = ScanSummary {
            files_scanned: report.files_scanned,
            routers_found: report.descriptors.len(),
            warnings: report.warnings,
            ..ScanSummary::default()
        };

        let mut registry = self.registry.lock();
        for descriptor in &report.descriptors {
            for route in descriptor.to_routes() {
                if registry.upsert_from(DiscoverySource::Static, route) != UpsertOutcome::Excluded {
                    summary.routes_upserted += 1;
                }
            }
        }
        summary.routes_pruned = registry.prune_stale(generation);

        info!(
            "Scanned {} files: {} routers, {} routes, {} pruned",
            summary.files_scanned,
            summary.routers_found,
            summary.routes_upserted,
            summary.routes_pruned
        );
        summary
    }

    pub fn document(&self) -> OpenApiDocument {
        OpenApiBuilder::from_config(&self.config).render(&self.registry.snapshot())
    }

    pub fn document_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.document())
            .map_err(|e| Error::SerializationError(e.to_string()))
    }

    pub fn document_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&self.document())
            .map_err(|e| Error::SerializationError(e.to_string()))
    }

    /// Path the JSON document is served from.
    pub fn spec_path(&self) -> String {
        self.config.spec_path()
    }

    /// Body for a request to `request_path`, `None` for any path but [`ApiDocs::spec_path`].
    pub fn serve(&self, request_path: &str) -> Option<Result<String>> {
        if normalize_path(request_path) != self.spec_path() {
            return None;
        }
        debug!("Serving document at {}", request_path);
        Some(self.document_json())
    }

    /// Whether a change notification should trigger a rescan of `root`.
    pub fn should_rescan(&self, root: &Path, event: &FileEvent) -> bool {
        // removed files are gone from disk, so only the path can be checked
        self.scanner.tree().accepts(root, &event.path)
    }
}
