use crate::error::EngineError;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Collects the Rust sources below a search root.
///
/// The walk is sorted by file name so that every run visits files in the same
/// order. Hidden entries, `target` directories and every configured exclusion
/// are pruned before descending.
///
/// # Example
///
/// ```no_run
/// use swagger_doc::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./my-project"))
///     .with_exclusions(Some("vendor,testdata"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} Rust files", result.rust_files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
    excluded: Vec<PathBuf>,
}

/// Result of a directory scan.
pub struct ScanResult {
    /// Every `.rs` file found, in walk order
    pub rust_files: Vec<PathBuf>,
    /// Entries that could not be read; scanning continued past them
    pub warnings: Vec<String>,
}

impl FileScanner {
    pub fn new(root_path: PathBuf) -> Self {
        Self {
            root_path,
            excluded: Vec::new(),
        }
    }

    /// Adds exclusions given as a comma-separated list of path fragments.
    ///
    /// Fragments are trimmed and empty ones ignored. A fragment matches an entry
    /// whose path relative to the root starts with it, or whose walked path is
    /// exactly the fragment.
    pub fn with_exclusions(mut self, excluded: Option<&str>) -> Self {
        if let Some(list) = excluded {
            self.excluded.extend(
                list.split(',')
                    .map(str::trim)
                    .filter(|fragment| !fragment.is_empty())
                    .map(PathBuf::from),
            );
        }
        self
    }

    fn is_excluded(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root_path).unwrap_or(path);
        self.excluded
            .iter()
            .any(|fragment| relative.starts_with(fragment) || path == fragment.as_path())
    }

    /// Walks the root and returns every `.rs` file that survives the filters.
    ///
    /// # Errors
    ///
    /// Fails only when the root itself is missing or is not a directory.
    /// Unreadable entries below the root become warnings.
    pub fn scan(&self) -> Result<ScanResult, EngineError> {
        if !self.root_path.is_dir() {
            return Err(EngineError::Scan {
                root: self.root_path.clone(),
                message: "not a directory".to_string(),
            });
        }

        let mut rust_files = Vec::new();
        let mut warnings = Vec::new();

        let walker = WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                if e.depth() == 0 {
                    return true;
                }
                let file_name = e.file_name().to_string_lossy();
                if file_name.starts_with('.') || file_name == "target" {
                    return false;
                }
                if self.is_excluded(e.path()) {
                    debug!("Excluding {}", e.path().display());
                    return false;
                }
                true
            });

        for entry in walker {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if entry.file_type().is_file()
                        && path.extension().and_then(|s| s.to_str()) == Some("rs")
                    {
                        rust_files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        Ok(ScanResult {
            rust_files,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn file_names(result: &ScanResult, root: &Path) -> Vec<String> {
        result
            .rust_files
            .iter()
            .map(|p| {
                p.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    fn project() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("src/models")).unwrap();
        fs::create_dir_all(root.join("vendor/dep")).unwrap();
        fs::create_dir_all(root.join("testdata")).unwrap();
        fs::write(root.join("src/main.rs"), "fn main() {}").unwrap();
        fs::write(root.join("src/models/user.rs"), "struct User {}").unwrap();
        fs::write(root.join("vendor/dep/lib.rs"), "pub fn dep() {}").unwrap();
        fs::write(root.join("testdata/sample.rs"), "fn sample() {}").unwrap();
        fs::write(root.join("README.md"), "# README").unwrap();
        temp_dir
    }

    #[test]
    fn test_scan_collects_rust_files_in_sorted_order() {
        let temp_dir = project();
        let root = temp_dir.path();

        let result = FileScanner::new(root.to_path_buf()).scan().unwrap();

        assert!(result.warnings.is_empty());
        assert_eq!(
            file_names(&result, root),
            vec![
                "src/main.rs",
                "src/models/user.rs",
                "testdata/sample.rs",
                "vendor/dep/lib.rs",
            ]
        );
    }

    #[test]
    fn test_scan_applies_comma_separated_exclusions() {
        let temp_dir = project();
        let root = temp_dir.path();

        let result = FileScanner::new(root.to_path_buf())
            .with_exclusions(Some("vendor, testdata"))
            .scan()
            .unwrap();

        assert_eq!(
            file_names(&result, root),
            vec!["src/main.rs", "src/models/user.rs"]
        );
    }

    #[test]
    fn test_scan_excludes_single_file() {
        let temp_dir = project();
        let root = temp_dir.path();

        let result = FileScanner::new(root.to_path_buf())
            .with_exclusions(Some("src/models/user.rs,,"))
            .scan()
            .unwrap();

        let names = file_names(&result, root);
        assert!(!names.contains(&"src/models/user.rs".to_string()));
        assert!(names.contains(&"src/main.rs".to_string()));
    }

    #[test]
    fn test_exclusion_matches_whole_components_only() {
        let temp_dir = project();
        let root = temp_dir.path();

        // "vend" is a prefix of "vendor" as a string but not as a path component
        let result = FileScanner::new(root.to_path_buf())
            .with_exclusions(Some("vend"))
            .scan()
            .unwrap();

        assert!(file_names(&result, root).contains(&"vendor/dep/lib.rs".to_string()));
    }

    #[test]
    fn test_scan_skips_target_and_hidden_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("target")).unwrap();
        fs::create_dir(root.join(".git")).unwrap();
        fs::write(root.join("target/build.rs"), "fn main() {}").unwrap();
        fs::write(root.join(".git/config.rs"), "// config").unwrap();
        fs::write(root.join("main.rs"), "fn main() {}").unwrap();

        let result = FileScanner::new(root.to_path_buf()).scan().unwrap();

        assert_eq!(file_names(&result, root), vec!["main.rs"]);
    }

    #[test]
    fn test_scan_missing_root_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");

        let result = FileScanner::new(missing).scan();

        assert!(matches!(result, Err(EngineError::Scan { .. })));
    }
}
