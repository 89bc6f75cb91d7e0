use openapi_from_routes::{
    config::DocsConfig,
    docs::{ApiDocs, FileEvent, FileEventKind},
    interceptor::Step,
    registry::UpsertOutcome,
    route::{HttpMethod, Route},
    route_table::RouteTable,
};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

fn write(root: &TempDir, path: &str, content: &str) {
    let file_path = root.path().join(path);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(file_path, content).unwrap();
}

const USERS_RS: &str = r#"
pub fn configure(users: &mut RouteTable<Handler>) {
    users.get("/users", vec![list]);
    users.get("/users/:id", vec![show]);
}
"#;

const ORDERS_RS: &str = r#"
pub fn configure(orders: &mut RouteTable<Handler>) {
    orders.get("/orders", vec![list]);
}
"#;

#[test]
fn test_removed_file_prunes_its_static_routes() {
    let project = TempDir::new().unwrap();
    write(&project, "src/users.rs", USERS_RS);
    write(&project, "src/orders.rs", ORDERS_RS);

    let api_docs = ApiDocs::new(DocsConfig::default());
    let mut app = api_docs.intercept(RouteTable::<Step<()>>::new());
    app.get("/health", [Step::Handler(())]);
    // also found statically, so it must survive the pruning
    app.get("/orders", [Step::Handler(())]);

    let first = api_docs.rescan(project.path());
    assert_eq!(first.routes_upserted, 3);
    assert_eq!(api_docs.registry().len(), 4);

    fs::remove_file(project.path().join("src/orders.rs")).unwrap();
    fs::remove_file(project.path().join("src/users.rs")).unwrap();
    write(&project, "src/users.rs", &USERS_RS.replace("\n    users.get(\"/users/:id\", vec![show]);", ""));

    let second = api_docs.rescan(project.path());
    assert_eq!(second.routes_pruned, 1);

    let paths: Vec<_> = api_docs
        .registry()
        .snapshot()
        .into_iter()
        .map(|r| r.path)
        .collect();
    assert_eq!(paths, vec!["/health", "/orders", "/users"]);
}

#[test]
fn test_repeated_rescans_are_stable() {
    let project = TempDir::new().unwrap();
    write(&project, "src/users.rs", USERS_RS);
    let api_docs = ApiDocs::new(DocsConfig::default());

    api_docs.rescan(project.path());
    let before = api_docs.document_json().unwrap();
    for _ in 0..3 {
        let summary = api_docs.rescan(project.path());
        assert_eq!(summary.routes_pruned, 0);
    }

    assert_eq!(api_docs.document_json().unwrap(), before);
}

#[test]
fn test_excluded_and_docs_paths_stay_out() {
    let project = TempDir::new().unwrap();
    write(
        &project,
        "src/app.rs",
        r#"
fn configure(router: &mut Router) {
    router.get("/internal/metrics", vec![metrics]);
    router.get("/docs/openapi.json", vec![spec]);
    router.get("/docsearch", vec![search]);
}
"#,
    );
    let config = DocsConfig {
        exclude: vec!["/internal".to_string()],
        ..DocsConfig::default()
    };
    let api_docs = ApiDocs::new(config);

    let summary = api_docs.rescan(project.path());

    assert_eq!(summary.routes_upserted, 1);
    assert_eq!(
        api_docs.register(Route::new(HttpMethod::Get, "/internal")),
        UpsertOutcome::Excluded
    );
    let document = api_docs.document();
    assert_eq!(document.paths.keys().collect::<Vec<_>>(), vec!["/docsearch"]);
}

#[test]
fn test_configured_extensions_and_watch_events() {
    let project = TempDir::new().unwrap();
    write(
        &project,
        "routes/api.rsx",
        "fn configure(router: &mut Router) {\n    router.get(\"/from-rsx\", vec![]);\n}\n",
    );
    write(&project, "target/generated.rsx", "fn configure(router: &mut Router) { router.get(\"/built\", vec![]); }");

    let config = DocsConfig::from_yaml_str("extensions: [rsx]").unwrap();
    let api_docs = ApiDocs::new(config);

    let summary = api_docs.rescan(project.path());
    assert_eq!(summary.files_scanned, 1);
    assert!(api_docs.registry().lock().exists(HttpMethod::Get, "/from-rsx"));

    let event = FileEvent {
        path: project.path().join("routes/api.rsx"),
        kind: FileEventKind::Modified,
    };
    assert!(api_docs.should_rescan(project.path(), &event));

    let ignored = FileEvent {
        path: project.path().join("routes/api.rs"),
        kind: FileEventKind::Created,
    };
    assert!(!api_docs.should_rescan(project.path(), &ignored));
}

#[test]
fn test_served_document_matches_rendered_document() {
    let api_docs = ApiDocs::new(DocsConfig::from_yaml_str("docs_path: /reference").unwrap());
    api_docs.register(Route::new(HttpMethod::Get, "/status").with_summary("Service status"));

    assert_eq!(api_docs.spec_path(), "/reference/openapi.json");
    let served = api_docs.serve("/reference/openapi.json").unwrap().unwrap();

    assert_eq!(served, api_docs.document_json().unwrap());
    assert!(api_docs.serve("/docs/openapi.json").is_none());
}
