//! Archive discovery: walk a directory tree and keep matching file names.

use crate::error::ConfigError;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Produces the archives to extract under a root directory.
pub trait Scanner {
    /// Absolute archive paths under `root`, in a stable order.
    fn scan(&self, root: &Path) -> Vec<PathBuf>;
}

/// Which file names count as archives.
#[derive(Debug, Clone, Default)]
pub struct ScanFilter {
    /// Regex searched anywhere in the file name
    pub pattern: Option<Regex>,

    /// Required extension, compared case-insensitively, without the dot
    pub extension: Option<String>,
}

impl ScanFilter {
    /// Build a filter from user input.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] if `pattern` does not compile.
    pub fn new(pattern: Option<&str>, extension: Option<&str>) -> Result<Self, ConfigError> {
        let pattern = pattern.map(Regex::new).transpose()?;
        let extension = extension
            .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty());

        Ok(Self { pattern, extension })
    }

    /// Whether `file_name` passes both the pattern and the extension check.
    pub fn matches(&self, file_name: &str) -> bool {
        if let Some(ext) = &self.extension {
            let lower = file_name.to_ascii_lowercase();
            let Some(stem) = lower.strip_suffix(ext.as_str()) else {
                return false;
            };
            if !stem.ends_with('.') {
                return false;
            }
        }

        self.pattern
            .as_ref()
            .map_or(true, |re| re.is_match(file_name))
    }
}

/// Filesystem scanner backed by `walkdir`.
#[derive(Debug, Clone, Default)]
pub struct FsScanner {
    filter: ScanFilter,
}

impl FsScanner {
    /// Scanner keeping files accepted by `filter`.
    pub fn new(filter: ScanFilter) -> Self {
        Self { filter }
    }
}

impl Scanner for FsScanner {
    fn scan(&self, root: &Path) -> Vec<PathBuf> {
        let root = std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf());
        let mut archives = Vec::new();

        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable path during scan: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy();
            if self.filter.matches(&file_name) {
                debug!("Found archive {}", entry.path().display());
                archives.push(entry.into_path());
            }
        }

        archives
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_filter_extension() {
        let filter = ScanFilter::new(None, Some(".zip")).unwrap();
        assert!(filter.matches("a.zip"));
        assert!(filter.matches("A.ZIP"));
        assert!(!filter.matches("a.zipx"));
        assert!(!filter.matches("azip"));
        assert!(!filter.matches("a.tar.gz"));

        let filter = ScanFilter::new(None, Some("zip")).unwrap();
        assert!(filter.matches("b.zip"));
    }

    #[test]
    fn test_filter_pattern() {
        let filter = ScanFilter::new(Some("^IUCN_.*r15o"), Some("zip")).unwrap();
        assert!(filter.matches("IUCN_Amphibians_r15o.zip"));
        assert!(!filter.matches("Other_r15o.zip"));
        assert!(!filter.matches("IUCN_Amphibians_r15o.txt"));
    }

    #[test]
    fn test_filter_no_constraints_accepts_all() {
        let filter = ScanFilter::default();
        assert!(filter.matches("anything"));
    }

    #[test]
    fn test_filter_invalid_pattern() {
        let result = ScanFilter::new(Some("(unclosed"), None);
        assert!(matches!(result, Err(ConfigError::InvalidPattern(_))));
    }

    #[test]
    fn test_scan_walks_tree_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("b/nested")).unwrap();
        fs::create_dir_all(root.join("a")).unwrap();
        fs::write(root.join("b/nested/two.zip"), b"").unwrap();
        fs::write(root.join("a/one.zip"), b"").unwrap();
        fs::write(root.join("a/notes.txt"), b"").unwrap();
        // Directories named like archives are ignored
        fs::create_dir_all(root.join("dir.zip")).unwrap();

        let scanner = FsScanner::new(ScanFilter::new(None, Some("zip")).unwrap());
        let found = scanner.scan(root);

        assert_eq!(
            found,
            vec![root.join("a/one.zip"), root.join("b/nested/two.zip")]
        );
        assert!(found.iter().all(|p| p.is_absolute()));
    }
}
