//! The shared store of discovered routes.
//!
//! Both discovery sources write into one [`RouteRegistry`], keyed by
//! `(method, normalized path)`. Entries keep first-seen order so the rendered
//! document is stable across runs.

use crate::route::{normalize_path, HttpMethod, Route};
use log::debug;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Where a route observation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiscoverySource {
    Static,
    Runtime,
    Manual,
}

/// Result of an [`RouteRegistry::upsert_from`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Merged,
    Excluded,
}

#[derive(Debug, Clone)]
struct Entry {
    route: Route,
    sources: BTreeSet<DiscoverySource>,
    seen_in: u64,
}

/// Deduplicating route store.
#[derive(Debug, Default)]
pub struct RouteRegistry {
    entries: Vec<Entry>,
    index: HashMap<(HttpMethod, String), usize>,
    exclusions: Vec<String>,
    generation: u64,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry that drops paths at or below any of `prefixes`.
    pub fn with_exclusions<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            exclusions: prefixes
                .into_iter()
                .map(|p| normalize_path(p.as_ref()))
                .collect(),
            ..Self::default()
        }
    }

    /// Whether `path` equals or lies below an excluded prefix.
    ///
    /// Matching is per segment: `/docs` excludes `/docs/ui` but not `/docsearch`.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclusions.iter().any(|prefix| path_has_prefix(path, prefix))
    }

    /// Records a manually registered route.
    pub fn upsert(&mut self, route: Route) -> UpsertOutcome {
        self.upsert_from(DiscoverySource::Manual, route)
    }

    /// Inserts `route`, or merges it into the entry with the same key.
    ///
    /// The path is normalized first, whatever built the route.
    pub fn upsert_from(&mut self, source: DiscoverySource, mut route: Route) -> UpsertOutcome {
        route.path = normalize_path(&route.path);
        if self.is_excluded(&route.path) {
            debug!("Excluded {} {}", route.method, route.path);
            return UpsertOutcome::Excluded;
        }

        let key = route.key();
        match self.index.get(&key) {
            Some(&position) => {
                let entry = &mut self.entries[position];
                entry.route.merge_from(route);
                entry.sources.insert(source);
                if source == DiscoverySource::Static {
                    entry.seen_in = self.generation;
                }
                UpsertOutcome::Merged
            }
            None => {
                debug!("Registered {} {} ({:?})", key.0, key.1, source);
                self.index.insert(key, self.entries.len());
                self.entries.push(Entry {
                    route,
                    sources: BTreeSet::from([source]),
                    seen_in: self.generation,
                });
                UpsertOutcome::Inserted
            }
        }
    }

    /// Copy of every route, in first-seen order.
    pub fn snapshot(&self) -> Vec<Route> {
        self.entries.iter().map(|e| e.route.clone()).collect()
    }

    pub fn exists(&self, method: HttpMethod, path: &str) -> bool {
        self.index
            .contains_key(&(method, normalize_path(path)))
    }

    pub fn get(&self, method: HttpMethod, path: &str) -> Option<&Route> {
        self.index
            .get(&(method, normalize_path(path)))
            .map(|&position| &self.entries[position].route)
    }

    /// Sources that contributed the route, empty when unknown.
    pub fn sources(&self, method: HttpMethod, path: &str) -> Vec<DiscoverySource> {
        self.index
            .get(&(method, normalize_path(path)))
            .map(|&position| self.entries[position].sources.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every route. Exclusions and the generation counter are kept.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    /// Starts a static scan and returns its generation.
    pub fn begin_scan(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Removes static-only routes the scan of `generation` did not see.
    ///
    /// Returns the number of routes removed.
    pub fn prune_stale(&mut self, generation: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| {
            let static_only =
                entry.sources.len() == 1 && entry.sources.contains(&DiscoverySource::Static);
            !(static_only && entry.seen_in < generation)
        });

        let pruned = before - self.entries.len();
        if pruned > 0 {
            self.index = self
                .entries
                .iter()
                .enumerate()
                .map(|(position, entry)| (entry.route.key(), position))
                .collect();
            debug!("Pruned {} stale static routes", pruned);
        }
        pruned
    }
}

fn path_has_prefix(path: &str, prefix: &str) -> bool {
    if prefix == "/" {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Shared handle to a registry.
///
/// Clones point at the same registry. A panic while the lock was held does not
/// make the registry unusable: the poisoned guard is taken over as is.
#[derive(Debug, Clone, Default)]
pub struct RegistryHandle {
    inner: Arc<Mutex<RouteRegistry>>,
}

impl RegistryHandle {
    pub fn new(registry: RouteRegistry) -> Self {
        Self {
            inner: Arc::new(Mutex::new(registry)),
        }
    }

    /// Locks the registry.
    ///
    /// The lock is not reentrant. Registering through an [`Intercepted`] proxy
    /// or rendering through [`ApiDocs`] locks it again, so drop the guard before
    /// either or the calling thread deadlocks.
    ///
    /// [`Intercepted`]: crate::interceptor::Intercepted
    /// [`ApiDocs`]: crate::docs::ApiDocs
    pub fn lock(&self) -> MutexGuard<'_, RouteRegistry> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn upsert_from(&self, source: DiscoverySource, route: Route) -> UpsertOutcome {
        self.lock().upsert_from(source, route)
    }

    pub fn snapshot(&self) -> Vec<Route> {
        self.lock().snapshot()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
