use crate::error::{Error, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Read access to a tree of source files.
///
/// The static scanner only needs to list candidate files under a root and read
/// them as text. [`FileScanner`] implements this for the local disk; other
/// implementations (in-memory trees, archives) can be plugged into
/// [`crate::extractor::StaticScanner`].
pub trait SourceTree {
    /// Lists the candidate source files below `root`.
    fn list_files(&self, root: &Path) -> Result<ScanResult>;

    /// Reads one file as UTF-8 text.
    fn read_file(&self, path: &Path) -> Result<String>;

    /// Whether `path` is a file this tree would list when scanning `root`.
    fn accepts(&self, root: &Path, path: &Path) -> bool;
}

/// File scanner for traversing project directories.
///
/// The `FileScanner` recursively walks through a project directory to find all source files
/// whose extension is in its allow-list (`rs` by default). It automatically skips common
/// directories that should be ignored, such as `target` and hidden directories (those
/// starting with `.`).
///
/// # Example
///
/// ```no_run
/// use openapi_from_routes::scanner::FileScanner;
/// use std::path::Path;
///
/// let scanner = FileScanner::new();
/// let result = scanner.scan(Path::new("./my-project")).unwrap();
/// println!("Found {} source files", result.files.len());
/// ```
#[derive(Debug, Clone)]
pub struct FileScanner {
    extensions: Vec<String>,
}

/// Result of directory scanning operation.
///
/// Contains the list of discovered files and any warnings encountered during scanning.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Paths to all discovered source files, sorted by path
    pub files: Vec<PathBuf>,
    /// Warning messages for any issues encountered (e.g., inaccessible directories)
    pub warnings: Vec<String>,
}

impl FileScanner {
    /// Creates a scanner accepting `.rs` files.
    pub fn new() -> Self {
        Self::with_extensions(["rs"])
    }

    /// Creates a scanner accepting the given extensions (without the leading dot).
    pub fn with_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Scans the directory tree and collects all files with an allowed extension.
    ///
    /// This method recursively traverses the directory tree starting from `root`. It
    /// automatically skips:
    /// - The `target` directory (build artifacts)
    /// - Hidden directories (starting with `.`)
    ///
    /// If any directories or files cannot be accessed, warnings are logged and added to
    /// the result, but scanning continues.
    pub fn scan(&self, root: &Path) -> Result<ScanResult> {
        let mut files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                // Don't filter the root directory itself
                e.path() == root || !is_skipped_name(&e.file_name().to_string_lossy())
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if entry.file_type().is_file() && self.has_allowed_extension(path) {
                        files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        debug!("Found {} candidate files under {}", files.len(), root.display());

        Ok(ScanResult { files, warnings })
    }

    fn has_allowed_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|ext| self.extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceTree for FileScanner {
    fn list_files(&self, root: &Path) -> Result<ScanResult> {
        self.scan(root)
    }

    fn read_file(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|e| Error::ScanError {
            file: path.to_path_buf(),
            message: format!("Failed to read file: {}", e),
        })
    }

    fn accepts(&self, root: &Path, path: &Path) -> bool {
        let relative = match path.strip_prefix(root) {
            Ok(relative) => relative,
            Err(_) => return false,
        };
        let in_skipped_dir = relative
            .parent()
            .map(|parent| {
                parent
                    .components()
                    .any(|c| is_skipped_name(&c.as_os_str().to_string_lossy()))
            })
            .unwrap_or(false);

        !in_skipped_dir && self.has_allowed_extension(path)
    }
}

// `.` and `..` components are not hidden directories
fn is_skipped_name(name: &str) -> bool {
    let is_hidden = name.starts_with('.') && name != "." && name != "..";
    is_hidden || name == "target"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_normal_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("main.rs"), "fn main() {}").unwrap();
        fs::write(root.join("lib.rs"), "pub fn test() {}").unwrap();
        fs::write(root.join("readme.md"), "# README").unwrap();

        let scanner = FileScanner::new();
        let result = scanner.scan(root).unwrap();

        assert_eq!(result.files.len(), 2);
        assert!(result.warnings.is_empty());

        let file_names: Vec<String> = result
            .files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();

        // sorted by file name
        assert_eq!(file_names, vec!["lib.rs".to_string(), "main.rs".to_string()]);
    }

    #[test]
    fn test_scan_empty_directory() {
        let temp_dir = TempDir::new().unwrap();

        let result = FileScanner::new().scan(temp_dir.path()).unwrap();

        assert!(result.files.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_scan_nested_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("src/routes")).unwrap();
        fs::create_dir(root.join("tests")).unwrap();

        fs::write(root.join("main.rs"), "fn main() {}").unwrap();
        fs::write(root.join("src/lib.rs"), "pub fn test() {}").unwrap();
        fs::write(root.join("src/routes/users.rs"), "struct User {}").unwrap();
        fs::write(root.join("tests/integration.rs"), "#[test] fn test() {}").unwrap();

        let result = FileScanner::new().scan(root).unwrap();

        assert_eq!(result.files.len(), 4);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_scan_skips_target_and_hidden_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir(root.join("target")).unwrap();
        fs::write(root.join("target/build.rs"), "fn main() {}").unwrap();
        fs::create_dir(root.join(".git")).unwrap();
        fs::write(root.join(".git/config.rs"), "// config").unwrap();
        fs::write(root.join("main.rs"), "fn main() {}").unwrap();

        let result = FileScanner::new().scan(root).unwrap();

        assert_eq!(result.files.len(), 1);
        assert_eq!(
            result.files[0].file_name().unwrap().to_string_lossy(),
            "main.rs"
        );
    }

    #[test]
    fn test_scan_with_custom_extensions() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("main.rs"), "fn main() {}").unwrap();
        fs::write(root.join("routes.ron"), "()").unwrap();
        fs::write(root.join("script.sh"), "#!/bin/bash").unwrap();

        let result = FileScanner::with_extensions([".rs", "RON"]).scan(root).unwrap();

        assert_eq!(result.files.len(), 2);
    }

    #[test]
    fn test_scan_missing_root_reports_warning() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("does-not-exist");

        let result = FileScanner::new().scan(&missing).unwrap();

        assert!(result.files.is_empty());
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_read_file_error_names_the_file() {
        let err = FileScanner::new()
            .read_file(Path::new("/nonexistent/file.rs"))
            .unwrap_err();

        assert!(err.to_string().contains("/nonexistent/file.rs"));
    }

    #[test]
    fn test_accepts() {
        let scanner = FileScanner::new();
        let root = Path::new("/work/.checkout");

        assert!(scanner.accepts(root, &root.join("src/routes/users.rs")));
        assert!(scanner.accepts(root, &root.join("main.rs")));
        assert!(!scanner.accepts(root, &root.join("src/readme.md")));
        assert!(!scanner.accepts(root, &root.join("target/debug/build.rs")));
        assert!(!scanner.accepts(root, &root.join(".git/hooks.rs")));
        assert!(!scanner.accepts(root, Path::new("/elsewhere/main.rs")));
    }
}
