//! Assembling the package directory from a finished work tree.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::builder::recipe::{PackageInfo, Recipe};
use crate::core::features::ResolvedFeatures;
use crate::core::settings::TargetProfile;
use crate::util::fs::{copy_matching, ensure_dir, remove_dir_all_if_exists, write_string};

/// Manifest written at the package root.
pub const MANIFEST_FILE: &str = "dockyard-package.json";

/// Result of packaging.
#[derive(Debug)]
pub struct PackageResult {
    pub package_dir: PathBuf,
    pub info: PackageInfo,
    /// Files copied into the package
    pub files: Vec<PathBuf>,
    /// Expected library files that the build did not produce
    pub missing: Vec<String>,
}

/// Copy build outputs from `work_root` into a fresh `package_dir`.
pub fn package(
    recipe: &dyn Recipe,
    profile: &TargetProfile,
    features: &ResolvedFeatures,
    work_root: &Path,
    package_dir: &Path,
) -> Result<PackageResult> {
    remove_dir_all_if_exists(package_dir)?;
    ensure_dir(package_dir)?;

    let mut files = Vec::new();
    for rule in recipe.package_rules(profile, features) {
        let copied = copy_matching(
            &work_root.join(&rule.src),
            &rule.pattern,
            &package_dir.join(&rule.dst),
            rule.keep_path,
        )
        .with_context(|| format!("failed to copy {} from {}", rule.pattern, rule.src.display()))?;

        tracing::debug!(
            "{} from {}: {} file(s)",
            rule.pattern,
            rule.src.display(),
            copied.len()
        );
        files.extend(copied);
    }

    let info = recipe.package_info(profile, features);
    let missing = missing_lib_files(&info, package_dir);
    for name in &missing {
        tracing::warn!("expected library {} was not produced", name);
    }

    write_manifest(&info, package_dir)?;

    tracing::info!(
        "Packaged {} {} into {} ({} files)",
        info.name,
        info.version,
        package_dir.display(),
        files.len()
    );

    Ok(PackageResult {
        package_dir: package_dir.to_path_buf(),
        info,
        files,
        missing,
    })
}

/// Library files listed in `info` that exist in none of its lib or bin dirs.
fn missing_lib_files(info: &PackageInfo, package_dir: &Path) -> Vec<String> {
    info.lib_files
        .iter()
        .filter(|name| {
            !info
                .lib_dirs
                .iter()
                .chain(&info.bin_dirs)
                .any(|dir| package_dir.join(dir).join(name).exists())
        })
        .cloned()
        .collect()
}

/// Write `dockyard-package.json`.
pub fn write_manifest(info: &PackageInfo, package_dir: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(info).context("failed to serialize package info")?;
    write_string(&package_dir.join(MANIFEST_FILE), &json)
}

/// Read the manifest of a built package.
pub fn read_manifest(package_dir: &Path) -> Result<PackageInfo> {
    let path = package_dir.join(MANIFEST_FILE);
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
}
