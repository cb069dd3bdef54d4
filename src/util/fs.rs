//! Filesystem utilities.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern};
use walkdir::WalkDir;

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory: {}", path.display()))
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write file: {}", path.display()))
}

/// Replace every occurrence of `search` in a text file.
///
/// Returns false, leaving the file untouched, when `search` does not occur.
pub fn replace_in_file(path: &Path, search: &str, replace: &str) -> Result<bool> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read file: {}", path.display()))?;

    if !contents.contains(search) {
        return Ok(false);
    }

    write_string(path, &contents.replace(search, replace))?;
    Ok(true)
}

/// Move a file, creating the destination directory if needed.
pub fn move_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        ensure_dir(parent)?;
    }
    fs::rename(from, to)
        .with_context(|| format!("failed to move {} to {}", from.display(), to.display()))
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Copy files under `src` whose relative path matches `pattern` into `dst`.
///
/// `*` matches across directory separators, so `*.a` finds archives at any
/// depth. With `keep_path` the path below `src` is preserved, otherwise
/// files land directly in `dst`. Returns the destination paths in sorted
/// order; a missing `src` copies nothing.
pub fn copy_matching(src: &Path, pattern: &str, dst: &Path, keep_path: bool) -> Result<Vec<PathBuf>> {
    let matcher =
        Pattern::new(pattern).with_context(|| format!("invalid copy pattern: {}", pattern))?;
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };

    if !src.is_dir() {
        return Ok(Vec::new());
    }

    let mut matches = Vec::new();
    for entry in WalkDir::new(src).follow_links(true).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {}", src.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let rel = relative_path(src, entry.path());
        if matcher.matches_with(&rel.to_string_lossy().replace('\\', "/"), options) {
            matches.push(rel);
        }
    }

    let mut copied = Vec::with_capacity(matches.len());
    for rel in matches {
        let from = src.join(&rel);
        let target = match (keep_path, rel.file_name()) {
            (false, Some(name)) => dst.join(name),
            _ => dst.join(&rel),
        };

        if let Some(parent) = target.parent() {
            ensure_dir(parent)?;
        }
        fs::copy(&from, &target).with_context(|| {
            format!("failed to copy {} to {}", from.display(), target.display())
        })?;
        copied.push(target);
    }

    copied.sort();
    copied.dedup();
    Ok(copied)
}
