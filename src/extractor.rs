//! Static route discovery by textual pattern matching.
//!
//! The [`StaticScanner`] walks a source tree and, for each file, looks for one
//! router declaration and the route calls made on it. It works on text, not on a
//! syntax tree: the patterns are approximate on purpose.
//!
//! A router declaration is any of:
//!
//! - a local binding: `let mut api = Router::new();`, `let app = docs.intercept(...)`
//! - an exported static: `pub static API: LazyLock<Router> = ...`
//! - a function parameter: `fn configure(router: &mut Router)`
//!
//! where the type or constructor's last path segment ends in `Router`,
//! `RouteTable` or `Intercepted`. Only the first declaration of a file counts.
//!
//! Route calls are `name.get("/path", ...)` for every supported verb, with plain
//! or raw string literals, and the template form `name.get(&format!("{base}/x"), ...)`
//! whose template is kept verbatim.
//!
//! # Known blind spots
//!
//! Routes registered through any of these are not found here; the runtime
//! interceptor ([`crate::interceptor`]) reports them instead:
//!
//! - routers built as one chained expression without a binding
//! - paths held in constants or variables (`router.get(USERS_PATH, ...)`)
//! - a router reached through a second binding or a struct field of another name
//! - any router after the first one in a file

use crate::error::Result;
use crate::route::{HttpMethod, Route};
use crate::scanner::{FileScanner, SourceTree};
use log::{debug, warn};
use regex::{Captures, Regex};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

fn compile_regex(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(_compile_err) => match Regex::new(r"$^") {
            Ok(fallback) => fallback,
            Err(fallback_err) => panic!("hardcoded fallback regex must compile: {fallback_err}"),
        },
    }
}

const ROUTER_TYPE: &str = r"\b[A-Za-z0-9_]*(?:Router|RouteTable|Intercepted|RouteTarget)";

static LOCAL_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    compile_regex(&format!(
        r"^\s*let\s+(?:mut\s+)?([A-Za-z_][A-Za-z0-9_]*)\s*(?::[^=]+)?=\s*(?:(?:[A-Za-z_][A-Za-z0-9_]*::)*{ROUTER_TYPE}(?:::<[^>]*>)?\s*::\s*(?:new|default|detached)\s*\(|[A-Za-z_][A-Za-z0-9_.]*\.intercept\s*\()"
    ))
});

static EXPORTED_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    compile_regex(&format!(
        r"^\s*pub(?:\([^)]*\))?\s+static\s+([A-Za-z_][A-Za-z0-9_]*)\s*:[^=]*{ROUTER_TYPE}"
    ))
});

static PARAMETER_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    compile_regex(&format!(
        r"\bfn\s+[A-Za-z_][A-Za-z0-9_]*\s*(?:<[^(]*>)?\s*\([^)]*?\b(?:mut\s+)?([A-Za-z_][A-Za-z0-9_]*)\s*:\s*(?:&\s*(?:'[A-Za-z_]+\s+)?mut\s+)?(?:impl\s+)?(?:[A-Za-z_][A-Za-z0-9_]*::)*{ROUTER_TYPE}"
    ))
});

const VERBS: &str = "get|post|put|delete|patch|head|options";

/// How a router was declared in its file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationStyle {
    /// `let router = Router::new();`
    Local,
    /// `pub static ROUTER: ... Router ...`
    Exported,
    /// `fn configure(router: &mut Router)`
    Parameter,
}

/// A route call found in source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteCall {
    pub method: HttpMethod,
    /// The path as written; templates are kept verbatim
    pub path: String,
    /// 1-based line of the call
    pub line: usize,
    /// Whether the path came from a `format!` template
    pub template: bool,
}

/// The router found in one file and the route calls made on it.
///
/// Descriptors are produced per scan and consumed right away; nothing keeps them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterDescriptor {
    pub source: PathBuf,
    pub declared_name: String,
    /// 1-based line of the declaration
    pub declaration_line: usize,
    pub style: DeclarationStyle,
    pub routes: Vec<RouteCall>,
}

impl RouterDescriptor {
    /// Converts the calls into registry routes.
    ///
    /// Static routes carry only method and path: whatever the runtime side
    /// documented about the same endpoint is left untouched on merge.
    pub fn to_routes(&self) -> Vec<Route> {
        self.routes
            .iter()
            .map(|call| Route::new(call.method, &call.path))
            .collect()
    }
}

/// Outcome of one scan of a source tree.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub descriptors: Vec<RouterDescriptor>,
    pub files_scanned: usize,
    pub warnings: Vec<String>,
}

/// Static scanner over a [`SourceTree`].
pub struct StaticScanner<T: SourceTree = FileScanner> {
    tree: T,
}

impl StaticScanner<FileScanner> {
    /// Creates a scanner over the local disk accepting `.rs` files.
    pub fn new() -> Self {
        Self::with_tree(FileScanner::new())
    }
}

impl Default for StaticScanner<FileScanner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: SourceTree> StaticScanner<T> {
    pub fn with_tree(tree: T) -> Self {
        Self { tree }
    }

    pub fn tree(&self) -> &T {
        &self.tree
    }

    /// Scans every candidate file below `root`, in path order.
    ///
    /// Files that cannot be read or matched are logged and contribute nothing.
    pub fn scan(&self, root: &Path) -> Vec<RouterDescriptor> {
        self.scan_report(root).descriptors
    }

    /// Like [`StaticScanner::scan`], also reporting counts and warnings.
    pub fn scan_report(&self, root: &Path) -> ScanReport {
        let mut report = ScanReport::default();

        let listing = match self.tree.list_files(root) {
            Ok(listing) => listing,
            Err(e) => {
                let warning = format!("Failed to list {}: {}", root.display(), e);
                warn!("{}", warning);
                report.warnings.push(warning);
                return report;
            }
        };
        report.warnings.extend(listing.warnings);

        for path in &listing.files {
            report.files_scanned += 1;

            let content = match self.tree.read_file(path) {
                Ok(content) => content,
                Err(e) => {
                    let warning = format!("Skipping {}: {}", path.display(), e);
                    warn!("{}", warning);
                    report.warnings.push(warning);
                    continue;
                }
            };

            match scan_source(path, &content) {
                Ok(Some(descriptor)) => {
                    debug!(
                        "Found router '{}' with {} routes in {}",
                        descriptor.declared_name,
                        descriptor.routes.len(),
                        path.display()
                    );
                    report.descriptors.push(descriptor);
                }
                Ok(None) => {}
                Err(e) => {
                    let warning = format!("Skipping {}: {}", path.display(), e);
                    warn!("{}", warning);
                    report.warnings.push(warning);
                }
            }
        }

        debug!(
            "Scan of {} complete: {} files, {} routers",
            root.display(),
            report.files_scanned,
            report.descriptors.len()
        );

        report
    }
}

/// Matches the content of a single file.
///
/// Returns `Ok(None)` when the file declares no router.
pub fn scan_source(path: &Path, content: &str) -> Result<Option<RouterDescriptor>> {
    let (declared_name, declaration_line, style) = match find_declaration(content) {
        Some(declaration) => declaration,
        None => return Ok(None),
    };

    let routes = find_route_calls(content, &declared_name)?;

    Ok(Some(RouterDescriptor {
        source: path.to_path_buf(),
        declared_name,
        declaration_line,
        style,
        routes,
    }))
}

fn find_declaration(content: &str) -> Option<(String, usize, DeclarationStyle)> {
    let patterns: [(&Regex, DeclarationStyle); 3] = [
        (&LOCAL_DECLARATION, DeclarationStyle::Local),
        (&EXPORTED_DECLARATION, DeclarationStyle::Exported),
        (&PARAMETER_DECLARATION, DeclarationStyle::Parameter),
    ];

    content.lines().enumerate().find_map(|(index, line)| {
        patterns.iter().find_map(|(regex, style)| {
            regex
                .captures(line)
                .and_then(|caps| caps.get(1))
                .map(|name| (name.as_str().to_string(), index + 1, *style))
        })
    })
}

/// Finds every `name.<verb>(path, ...)` call in the whole content, in source order.
fn find_route_calls(content: &str, name: &str) -> Result<Vec<RouteCall>> {
    let receiver = regex::escape(name);
    let literal = Regex::new(&format!(
        r##"\b{receiver}\s*\.\s*({VERBS})\s*\(\s*(?:"((?:[^"\\\n]|\\.)*)"|r"([^"\n]*)"|r#"([^\n]*?)"#)"##
    ))?;
    let template = Regex::new(&format!(
        r#"\b{receiver}\s*\.\s*({VERBS})\s*\(\s*&?\s*format!\s*\(\s*"((?:[^"\\\n]|\\.)*)""#
    ))?;

    let mut calls: Vec<(usize, RouteCall)> = Vec::new();

    for caps in literal.captures_iter(content) {
        if let Some(call) = route_call(content, &caps, false) {
            calls.push(call);
        }
    }
    for caps in template.captures_iter(content) {
        if let Some(call) = route_call(content, &caps, true) {
            calls.push(call);
        }
    }

    calls.sort_by_key(|(offset, _)| *offset);
    Ok(calls.into_iter().map(|(_, call)| call).collect())
}

fn route_call(content: &str, caps: &Captures, template: bool) -> Option<(usize, RouteCall)> {
    let whole = caps.get(0)?;
    let method = caps.get(1)?.as_str().parse::<HttpMethod>().ok()?;
    let path = (2..caps.len()).find_map(|i| caps.get(i))?.as_str().to_string();

    Some((
        whole.start(),
        RouteCall {
            method,
            path,
            line: line_number(content, whole.start()),
            template,
        },
    ))
}

fn line_number(content: &str, offset: usize) -> usize {
    content[..offset].matches('\n').count() + 1
}
