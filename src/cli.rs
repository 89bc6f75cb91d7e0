use crate::config::DocsConfig;
use crate::docs::ApiDocs;
use crate::serializer::{serialize, write_to_file, OutputFormat};
use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use std::path::PathBuf;

/// Generate OpenAPI documentation from the routes a Rust project registers
#[derive(Parser, Debug)]
#[command(name = "openapi-from-routes")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the project directory
    #[arg(value_name = "PROJECT_PATH")]
    pub project_path: PathBuf,

    /// Output format (yaml or json); taken from the output file extension when
    /// omitted, YAML otherwise
    #[arg(short = 'f', long = "format", value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Configuration file (YAML, or JSON when it ends in .json)
    #[arg(short = 'c', long = "config", value_name = "CONFIG")]
    pub config_path: Option<PathBuf>,

    /// API title, overriding the configuration
    #[arg(long = "title")]
    pub title: Option<String>,

    /// API version, overriding the configuration
    #[arg(long = "api-version")]
    pub api_version: Option<String>,

    /// Path prefix to leave out of the document (repeatable)
    #[arg(short = 'x', long = "exclude", value_name = "PREFIX")]
    pub exclude: Vec<String>,

    /// Source file extension to scan (repeatable, replaces the configured list)
    #[arg(short = 'e', long = "extension", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl CliArgs {
    /// The format to write: the flag, else the output extension, else YAML.
    pub fn format(&self) -> OutputFormat {
        self.output_format
            .or_else(|| self.output_path.as_deref().and_then(OutputFormat::from_extension))
            .unwrap_or(OutputFormat::Yaml)
    }
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.project_path.exists() {
        anyhow::bail!(
            "Project path does not exist: {}",
            args.project_path.display()
        );
    }

    if !args.project_path.is_dir() {
        anyhow::bail!(
            "Project path is not a directory: {}",
            args.project_path.display()
        );
    }

    info!("Project path: {}", args.project_path.display());
    info!("Output format: {:?}", args.format());
    match &args.output_path {
        Some(output) => info!("Output file: {}", output.display()),
        None => info!("Output: stdout"),
    }

    Ok(args)
}

/// Loads the configuration file, if any, and overlays the command line flags.
pub fn load_config(args: &CliArgs) -> Result<DocsConfig> {
    let mut config = match &args.config_path {
        Some(path) => DocsConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => DocsConfig::default(),
    };

    if let Some(title) = &args.title {
        config.title = Some(title.clone());
    }
    if let Some(version) = &args.api_version {
        config.version = Some(version.clone());
    }
    config.exclude.extend(args.exclude.iter().cloned());
    if !args.extensions.is_empty() {
        config.extensions = args.extensions.clone();
    }

    Ok(config)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting OpenAPI document generation...");

    let config = load_config(&args)?;
    let docs = ApiDocs::new(config);

    let manual = docs.register_manifest();
    if manual > 0 {
        info!("Registered {} routes from the configuration", manual);
    }

    info!("Scanning project directory...");
    let summary = docs.rescan(&args.project_path);
    for warning in &summary.warnings {
        debug!("Scan warning: {}", warning);
    }

    let document = docs.document();
    if document.paths.is_empty() {
        warn!("No routes found in the project");
    }

    let format = args.format();
    info!("Serializing to {:?} format...", format);
    let content = serialize(&document, format)?;

    if let Some(output_path) = &args.output_path {
        info!("Writing output to: {}", output_path.display());
        write_to_file(&content, output_path)?;
    } else {
        println!("{}", content);
    }

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Files scanned: {}", summary.files_scanned);
    info!("  - Routers found: {}", summary.routers_found);
    info!("  - Paths documented: {}", document.paths.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn args(extra: &[&str]) -> CliArgs {
        let mut argv = vec!["openapi-from-routes", "."];
        argv.extend_from_slice(extra);
        CliArgs::parse_from(argv)
    }

    #[test]
    fn test_defaults() {
        let args = args(&[]);

        assert_eq!(args.output_format, None);
        assert_eq!(args.format(), OutputFormat::Yaml);
        assert!(args.output_path.is_none());
        assert!(args.exclude.is_empty());
        assert!(!args.verbose);
    }

    #[test]
    fn test_flags() {
        let args = args(&[
            "-f", "json", "-o", "out.json", "--title", "Shop", "--api-version", "2.0.0", "-x",
            "/internal", "--exclude", "/admin", "-e", "rs", "-v",
        ]);

        assert_eq!(args.format(), OutputFormat::Json);
        assert_eq!(args.output_path, Some(PathBuf::from("out.json")));
        assert_eq!(args.exclude, vec!["/internal", "/admin"]);
        assert_eq!(args.extensions, vec!["rs"]);
        assert!(args.verbose);
    }

    #[test]
    fn test_format_follows_output_extension() {
        assert_eq!(args(&["-o", "api/openapi.json"]).format(), OutputFormat::Json);
        assert_eq!(args(&["-o", "openapi.yml"]).format(), OutputFormat::Yaml);
        assert_eq!(args(&["-o", "openapi.txt"]).format(), OutputFormat::Yaml);
        assert_eq!(args(&["-o", "openapi.json", "-f", "yaml"]).format(), OutputFormat::Yaml);
    }

    #[test]
    fn test_load_config_overlays_flags() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("docs.yaml");
        fs::write(&path, "title: From file\nversion: 0.1.0\nexclude: [/health]\n").unwrap();

        let mut parsed = args(&["--title", "From flag", "-x", "/admin"]);
        parsed.config_path = Some(path);
        let config = load_config(&parsed).unwrap();

        assert_eq!(config.title.as_deref(), Some("From flag"));
        assert_eq!(config.version.as_deref(), Some("0.1.0"));
        assert_eq!(config.exclude, vec!["/health", "/admin"]);
        assert_eq!(config.extensions, vec!["rs"]);
    }

    #[test]
    fn test_parse_rejects_missing_project() {
        let temp_dir = TempDir::new().unwrap();
        let mut parsed = args(&[]);
        parsed.project_path = temp_dir.path().join("missing");

        assert!(parse_args_from_parsed(parsed).is_err());
    }

    #[test]
    fn test_parse_rejects_file_as_project() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("main.rs");
        fs::write(&file, "fn main() {}").unwrap();
        let mut parsed = args(&[]);
        parsed.project_path = file;

        assert!(parse_args_from_parsed(parsed).is_err());
    }

    #[test]
    fn test_run_writes_document() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("routes.rs"),
            "fn configure(router: &mut Router) {\n    router.get(\"/ping\", vec![]);\n}\n",
        )
        .unwrap();
        let output = temp_dir.path().join("out/openapi.json");

        let mut parsed = args(&[]);
        parsed.project_path = temp_dir.path().to_path_buf();
        parsed.output_path = Some(output.clone());
        run(parsed).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(output).unwrap()).unwrap();
        assert_eq!(value["openapi"], "3.0.3");
        assert!(value["paths"]["/ping"]["get"].is_object());
    }
}
