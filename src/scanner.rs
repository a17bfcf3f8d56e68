use anyhow::Result;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Directory names that never contain annotated sources
const DEFAULT_EXCLUDED_DIRS: [&str; 1] = ["target"];

/// Lists the Rust source files of a project in a stable order.
///
/// Hidden directories (starting with `.`) and build output directories are
/// skipped. The resulting list is sorted by path, so the order fragments are
/// merged in never depends on how the file system enumerates directories.
///
/// # Example
///
/// ```no_run
/// use openapi_from_comments::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let result = FileScanner::new(PathBuf::from("./my-project")).scan().unwrap();
/// for file in &result.rust_files {
///     println!("{}", file.display());
/// }
/// ```
pub struct FileScanner {
    root_path: PathBuf,
    excluded_dirs: Vec<String>,
}

/// Source files found by a [`FileScanner`].
pub struct ScanResult {
    /// `.rs` files under the root, sorted by path
    pub rust_files: Vec<PathBuf>,
    /// Entries that could not be read; scanning continued past them
    pub warnings: Vec<String>,
}

impl FileScanner {
    /// Creates a scanner rooted at `root_path` that skips `target` directories
    pub fn new(root_path: PathBuf) -> Self {
        Self {
            root_path,
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect(),
        }
    }

    /// Skips directories with the given name in addition to the defaults
    pub fn exclude_dir(mut self, name: impl Into<String>) -> Self {
        self.excluded_dirs.push(name.into());
        self
    }

    /// Walks the directory tree and collects every `.rs` file.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is not an accessible directory. Entries
    /// below the root that cannot be read only produce warnings.
    pub fn scan(&self) -> Result<ScanResult> {
        debug!("Scanning {} for Rust sources", self.root_path.display());

        if !self.root_path.is_dir() {
            anyhow::bail!("Not a directory: {}", self.root_path.display());
        }

        let mut rust_files = Vec::new();
        let mut warnings = Vec::new();

        let walker = WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !self.is_skipped(e));

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && is_rust_source(entry.path()) {
                        rust_files.push(entry.into_path());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        rust_files.sort();
        debug!("Found {} Rust source files", rust_files.len());

        Ok(ScanResult {
            rust_files,
            warnings,
        })
    }

    fn is_skipped(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') {
            return true;
        }
        entry.file_type().is_dir() && self.excluded_dirs.iter().any(|d| *d == name)
    }
}

fn is_rust_source(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("rs")
}
