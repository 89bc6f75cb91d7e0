//! A small in-process router.
//!
//! [`RouteTable`] is the router [`crate::interceptor::Intercepted`] wraps when an
//! application has no framework router of its own, and the reference
//! implementation of [`RouteTarget`]. Paths are kept in the syntax they were
//! registered with (`/users/:id`); matching understands `:name`, `{name}` and a
//! trailing `*rest` / `{*rest}` wildcard.

use crate::error::{Error, Result};
use crate::interceptor::RouteTarget;
use crate::route::HttpMethod;

/// One registered route.
#[derive(Debug, Clone)]
pub struct TableEntry<H> {
    pub method: HttpMethod,
    pub path: String,
    pub chain: Vec<H>,
}

/// A successful lookup.
#[derive(Debug)]
pub struct RouteMatch<'a, H> {
    pub chain: &'a [H],
    /// Extracted path parameters, in path order
    pub params: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct RouteTable<H> {
    entries: Vec<TableEntry<H>>,
}

impl<H> Default for RouteTable<H> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<H> RouteTable<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> &[TableEntry<H>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finds the first route registered for `method` that matches `request_path`.
    pub fn find(&self, method: HttpMethod, request_path: &str) -> Option<RouteMatch<'_, H>> {
        self.entries
            .iter()
            .filter(|entry| entry.method == method)
            .find_map(|entry| {
                match_path(&entry.path, request_path).map(|params| RouteMatch {
                    chain: &entry.chain,
                    params,
                })
            })
    }
}

impl<H> RouteTarget for RouteTable<H> {
    type Handler = H;

    fn register(&mut self, method: HttpMethod, path: &str, chain: Vec<H>) -> Result<()> {
        if path.trim().is_empty() {
            return Err(Error::InvalidArgument(format!(
                "cannot register {} with an empty path",
                method
            )));
        }
        self.entries.push(TableEntry {
            method,
            path: path.to_string(),
            chain,
        });
        Ok(())
    }

    fn mount(&mut self, base: &str, child: Self) -> Result<()> {
        if base.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "cannot mount a router at an empty path".to_string(),
            ));
        }
        for entry in child.entries {
            self.entries.push(TableEntry {
                path: prefixed(base, &entry.path),
                ..entry
            });
        }
        Ok(())
    }
}

// Same slash handling as `route::join_paths`, minus normalization: the table
// matches on the framework's own `:id` and `*rest` syntax.
fn prefixed(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    match (base.is_empty(), path.is_empty()) {
        (true, true) => "/".to_string(),
        (_, true) => base.to_string(),
        _ => format!("{}/{}", base, path),
    }
}

fn match_path(pattern: &str, request_path: &str) -> Option<Vec<(String, String)>> {
    let pattern: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let request: Vec<&str> = request_path.split('/').filter(|s| !s.is_empty()).collect();
    let mut params = Vec::new();

    for (position, segment) in pattern.iter().enumerate() {
        if let Some(name) = wildcard_name(segment) {
            if position + 1 == pattern.len() {
                params.push((name.to_string(), request.get(position..)?.join("/")));
                return Some(params);
            }
        }

        let value = request.get(position)?;
        match placeholder_name(segment) {
            Some(name) => params.push((name.to_string(), value.to_string())),
            None if segment == value => {}
            None => return None,
        }
    }

    (pattern.len() == request.len()).then_some(params)
}

fn placeholder_name(segment: &str) -> Option<&str> {
    segment
        .strip_prefix(':')
        .or_else(|| segment.strip_prefix('{')?.strip_suffix('}'))
}

fn wildcard_name(segment: &str) -> Option<&str> {
    segment
        .strip_prefix('*')
        .or_else(|| segment.strip_prefix("{*")?.strip_suffix('}'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable<&'static str> {
        let mut table = RouteTable::new();
        table.register(HttpMethod::Get, "/", vec!["root"]).unwrap();
        table
            .register(HttpMethod::Get, "/users/:id", vec!["auth", "show"])
            .unwrap();
        table
            .register(HttpMethod::Delete, "/users/{id}", vec!["destroy"])
            .unwrap();
        table
            .register(HttpMethod::Get, "/files/*rest", vec!["files"])
            .unwrap();
        table
    }

    #[test]
    fn test_find_literal_and_root() {
        let table = table();

        assert_eq!(table.find(HttpMethod::Get, "/").unwrap().chain, &["root"]);
        assert!(table.find(HttpMethod::Post, "/").is_none());
        assert!(table.find(HttpMethod::Get, "/nothing").is_none());
    }

    #[test]
    fn test_find_extracts_params() {
        let table = table();

        let found = table.find(HttpMethod::Get, "/users/42").unwrap();
        assert_eq!(found.chain, &["auth", "show"]);
        assert_eq!(found.params, vec![("id".to_string(), "42".to_string())]);

        let found = table.find(HttpMethod::Delete, "/users/7/").unwrap();
        assert_eq!(found.params, vec![("id".to_string(), "7".to_string())]);

        assert!(table.find(HttpMethod::Get, "/users/42/posts").is_none());
    }

    #[test]
    fn test_find_wildcard_takes_the_rest() {
        let table = table();

        let found = table.find(HttpMethod::Get, "/files/a/b/c.txt").unwrap();
        assert_eq!(
            found.params,
            vec![("rest".to_string(), "a/b/c.txt".to_string())]
        );
    }

    #[test]
    fn test_register_rejects_empty_path() {
        let mut table: RouteTable<()> = RouteTable::new();

        let err = table.register(HttpMethod::Get, "  ", vec![]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(table.is_empty());
    }

    #[test]
    fn test_mount_prefixes_child_routes() {
        let mut users = RouteTable::new();
        users.register(HttpMethod::Get, "/", vec![1]).unwrap();
        users.register(HttpMethod::Get, "/:id", vec![2]).unwrap();

        let mut api = RouteTable::new();
        api.mount("/api/users/", users).unwrap();

        let paths: Vec<_> = api.routes().iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["/api/users", "/api/users/:id"]);
        assert_eq!(api.find(HttpMethod::Get, "/api/users/9").unwrap().chain, &[2]);
    }
}
