//! Recursive discovery of files to format
//!
//! Files are reported in the order the directory walk yields them. Nothing is
//! sorted, so the order is only as stable as the underlying file system.
//!
//! Matching is case-sensitive on the final extension. Hidden directories are
//! searched. Symbolic links are neither followed nor reported, so a linked
//! file is only formatted through its real location under the base directory.

use crate::error::DiscoveryError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extension of the files formatted by default
pub const DEFAULT_EXTENSION: &str = "hcl";

/// Produces the ordered list of files to process under a base directory
pub trait Enumerator {
    /// # Errors
    ///
    /// Any failure to enumerate the tree is fatal for the run.
    fn enumerate(&self, root: &Path) -> Result<Vec<PathBuf>, DiscoveryError>;
}

/// Walks a directory tree and keeps regular files with a given extension
#[derive(Debug, Clone)]
pub struct ExtensionWalker {
    extension: String,
}

impl ExtensionWalker {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    fn matches(&self, path: &Path) -> bool {
        path.extension().and_then(|s| s.to_str()) == Some(self.extension.as_str())
    }
}

impl Default for ExtensionWalker {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSION)
    }
}

impl Enumerator for ExtensionWalker {
    fn enumerate(&self, root: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
        if root.exists() && !root.is_dir() {
            return Err(DiscoveryError::NotADirectory {
                root: root.to_path_buf(),
            });
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(root).follow_links(false) {
            let entry = entry.map_err(|source| DiscoveryError::Walk {
                root: root.to_path_buf(),
                source,
            })?;
            if entry.file_type().is_file() && self.matches(entry.path()) {
                files.push(entry.into_path());
            }
        }

        log::debug!(
            "found {} *.{} file(s) under {}",
            files.len(),
            self.extension,
            root.display()
        );
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "a = 1\n").unwrap();
        path
    }

    fn sorted(mut paths: Vec<PathBuf>) -> Vec<PathBuf> {
        paths.sort();
        paths
    }

    #[test]
    fn finds_files_at_every_depth_exactly_once() {
        let dir = TempDir::new().unwrap();
        let expected = sorted(vec![
            touch(dir.path(), "top.hcl"),
            touch(dir.path(), "one/mid.hcl"),
            touch(dir.path(), "one/two/three/deep.hcl"),
        ]);
        touch(dir.path(), "one/notes.txt");

        let found = ExtensionWalker::default().enumerate(dir.path()).unwrap();
        assert_eq!(sorted(found), expected);
    }

    #[test]
    fn searches_hidden_directories() {
        let dir = TempDir::new().unwrap();
        let hidden = touch(dir.path(), ".terraform/modules/x.hcl");

        let found = ExtensionWalker::default().enumerate(dir.path()).unwrap();
        assert_eq!(found, vec![hidden]);
    }

    #[test]
    fn extension_match_is_case_sensitive() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "UPPER.HCL");
        touch(dir.path(), "Mixed.Hcl");
        touch(dir.path(), "archive.hcl.bak");
        let lower = touch(dir.path(), "lower.hcl");

        let found = ExtensionWalker::default().enumerate(dir.path()).unwrap();
        assert_eq!(found, vec![lower]);
    }

    #[test]
    fn skips_directories_named_like_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("dir.hcl")).unwrap();

        let found = ExtensionWalker::default().enumerate(dir.path()).unwrap();
        assert!(found.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn does_not_follow_or_report_symlinks() {
        let dir = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let real = touch(dir.path(), "real.hcl");
        touch(outside.path(), "elsewhere.hcl");
        std::os::unix::fs::symlink(&real, dir.path().join("link.hcl")).unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("linked_dir")).unwrap();

        let found = ExtensionWalker::default().enumerate(dir.path()).unwrap();
        assert_eq!(found, vec![real]);
    }

    #[test]
    fn empty_directory_yields_nothing() {
        let dir = TempDir::new().unwrap();
        let found = ExtensionWalker::default().enumerate(dir.path()).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = ExtensionWalker::default()
            .enumerate(&dir.path().join("nope"))
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::Walk { .. }));
    }

    #[test]
    fn file_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        let file = touch(dir.path(), "a.hcl");
        let err = ExtensionWalker::default().enumerate(&file).unwrap_err();
        assert!(matches!(err, DiscoveryError::NotADirectory { .. }));
    }

    #[test]
    fn custom_extension() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.hcl");
        let tf = touch(dir.path(), "main.tf");

        let walker = ExtensionWalker::new("tf");
        assert_eq!(walker.extension(), "tf");
        assert_eq!(walker.enumerate(dir.path()).unwrap(), vec![tf]);
    }
}
