//! File tree fixtures.
//!
//! Stand-ins for extracted source trees and build outputs, written into a
//! temporary directory.

use std::path::PathBuf;

use tempfile::TempDir;

/// A set of files to materialize under a temporary root.
#[derive(Debug, Clone, Default)]
pub struct TreeFixture {
    files: Vec<(PathBuf, String)>,
}

impl TreeFixture {
    pub fn new() -> Self {
        TreeFixture::default()
    }

    /// Add a file (path relative to the root).
    pub fn file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.push((path.into(), content.into()));
        self
    }

    /// Add several empty files.
    pub fn empty_files<'a>(mut self, paths: impl IntoIterator<Item = &'a str>) -> Self {
        for path in paths {
            self.files.push((PathBuf::from(path), String::new()));
        }
        self
    }

    /// Write the tree into a new temporary directory.
    pub fn create(&self) -> TempDir {
        let tmp = TempDir::new().unwrap();
        for (path, content) in &self.files {
            let full = tmp.path().join(path);
            if let Some(parent) = full.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(&full, content).unwrap();
        }
        tmp
    }
}
