//! Recipe trait definition and translation entry points.
//!
//! A recipe is a translation table for one upstream library version: it
//! declares the features it accepts, where its sources come from, how a
//! profile maps to build tool invocations, and what the packaged result
//! looks like to consumers. Recipes never run anything themselves.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::builder::naming::ArtifactNamingScheme;
use crate::builder::plan::BuildPlan;
use crate::core::errors::ConfigError;
use crate::core::features::{FeatureSchema, FeatureSet, ResolvedFeatures};
use crate::core::settings::{Os, TargetProfile};

/// Where the upstream sources come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceSpec {
    /// A gzip tarball, tried URL by URL until one downloads
    Archive {
        urls: Vec<String>,
        file_name: String,
        sha256: Option<String>,
    },
    /// A git repository pinned to a revision
    Git {
        url: String,
        rev: String,
        /// Checkout directory, relative to the work root
        dest: PathBuf,
    },
}

/// A glob copy from the work tree into the package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyRule {
    /// Pattern matched against paths relative to `src`; `*` crosses directories
    pub pattern: String,
    /// Source directory, relative to the work root
    pub src: PathBuf,
    /// Destination directory, relative to the package root
    pub dst: PathBuf,
    /// Keep the path below `src` instead of flattening to the file name
    pub keep_path: bool,
}

impl CopyRule {
    pub fn new(pattern: impl Into<String>, src: impl Into<PathBuf>, dst: impl Into<PathBuf>) -> Self {
        CopyRule {
            pattern: pattern.into(),
            src: src.into(),
            dst: dst.into(),
            keep_path: true,
        }
    }

    /// Copy matched files directly into `dst`.
    pub fn flatten(mut self) -> Self {
        self.keep_path = false;
        self
    }
}

/// What a consumer of the package needs to know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub name: String,
    pub version: String,
    pub profile: String,
    pub header_only: bool,
    /// Linkable library names, in the host's naming convention
    pub libs: Vec<String>,
    /// Exact library file names the build produces
    pub lib_files: Vec<String>,
    /// Preprocessor defines consumers must set
    pub defines: Vec<String>,
    pub include_dirs: Vec<String>,
    pub lib_dirs: Vec<String>,
    pub bin_dirs: Vec<String>,
    /// Upstream packages this one needs, as `name/version`
    pub requires: Vec<String>,
    /// Effective feature values
    pub features: BTreeMap<String, bool>,
}

impl PackageInfo {
    /// Package info with the standard layout and no libraries.
    pub fn new(recipe: &dyn Recipe, profile: &TargetProfile, features: &ResolvedFeatures) -> Self {
        PackageInfo {
            name: recipe.name().to_string(),
            version: recipe.version().to_string(),
            profile: profile.identity(),
            header_only: false,
            libs: Vec::new(),
            lib_files: Vec::new(),
            defines: Vec::new(),
            include_dirs: vec!["include".to_string()],
            lib_dirs: vec!["lib".to_string()],
            bin_dirs: vec!["bin".to_string()],
            requires: Vec::new(),
            features: features
                .iter()
                .map(|f| (f.name.to_string(), f.enabled))
                .collect(),
        }
    }

    /// Add libraries along with their expected files.
    pub fn with_libs<'a>(
        mut self,
        naming: &ArtifactNamingScheme,
        bases: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        for base in bases {
            self.libs.push(naming.link_name(base));
            self.lib_files.extend(naming.file_names(base));
        }
        self
    }
}

/// Trait for library recipes.
///
/// Each recipe knows how to translate a profile and its features into
/// invocations of one upstream build system.
pub trait Recipe: Send + Sync {
    /// Recipe name (lowercase, as used on the command line).
    fn name(&self) -> &'static str;

    /// Upstream version the recipe builds.
    fn version(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn license(&self) -> &'static str;

    /// Features accepted for this profile.
    fn features(&self, profile: &TargetProfile) -> FeatureSchema;

    /// Where to fetch sources for this profile.
    fn source(&self, profile: &TargetProfile) -> SourceSpec;

    /// Directory holding the fetched sources, relative to the work root.
    fn source_dir(&self, profile: &TargetProfile) -> PathBuf;

    /// Reject profiles the recipe cannot build.
    fn check_profile(&self, _profile: &TargetProfile) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Whether these features select nothing to compile.
    fn header_only(&self, _features: &ResolvedFeatures) -> bool {
        false
    }

    /// Translate a profile and resolved features into a build plan.
    fn plan(
        &self,
        profile: &TargetProfile,
        features: &ResolvedFeatures,
    ) -> Result<BuildPlan, ConfigError>;

    /// Naming scheme of the produced libraries.
    fn naming(&self, profile: &TargetProfile, features: &ResolvedFeatures) -> ArtifactNamingScheme;

    /// Files to copy into the package.
    fn package_rules(&self, profile: &TargetProfile, features: &ResolvedFeatures) -> Vec<CopyRule>;

    /// Consumer-facing package description.
    fn package_info(&self, profile: &TargetProfile, features: &ResolvedFeatures) -> PackageInfo;
}

/// Validate features against the recipe's schema and apply link overrides.
pub fn resolve_features(
    recipe: &dyn Recipe,
    profile: &TargetProfile,
    features: &FeatureSet,
) -> Result<ResolvedFeatures, ConfigError> {
    recipe.check_profile(profile)?;

    let schema = recipe.features(profile);
    let mut resolved = ResolvedFeatures::resolve(&schema, features)?;
    apply_link_overrides(recipe, profile, &mut resolved);

    Ok(resolved)
}

/// Force `shared` off where the target cannot produce shared libraries.
///
/// This is a documented override, not an error: a static C runtime and iOS
/// both only support static library output. Header-only selections link
/// nothing, so they are left alone.
pub fn apply_link_overrides(
    recipe: &dyn Recipe,
    profile: &TargetProfile,
    features: &mut ResolvedFeatures,
) {
    if !features.enabled("shared") || recipe.header_only(features) {
        return;
    }

    let reason = if profile.compiler.has_static_runtime() {
        format!(
            "static runtime {} only supports static libraries",
            profile.compiler.runtime().map(|rt| rt.to_string()).unwrap_or_default()
        )
    } else if profile.os == Os::Ios {
        "iOS builds only produce static libraries".to_string()
    } else {
        return;
    };

    tracing::warn!("{}: forcing shared=false ({})", features.recipe(), reason);
    features.force("shared", false, reason);
}

/// Translate a profile and feature set into a build plan.
///
/// Pure and deterministic: no file system or network access, and the same
/// inputs always produce the same ordered steps.
pub fn translate(
    recipe: &dyn Recipe,
    profile: &TargetProfile,
    features: &FeatureSet,
) -> Result<BuildPlan, ConfigError> {
    let resolved = resolve_features(recipe, profile, features)?;
    plan_resolved(recipe, profile, &resolved)
}

/// Build the plan for features that were already resolved.
pub fn plan_resolved(
    recipe: &dyn Recipe,
    profile: &TargetProfile,
    resolved: &ResolvedFeatures,
) -> Result<BuildPlan, ConfigError> {
    let mut plan = recipe.plan(profile, resolved)?;
    plan.forced = resolved.forced();

    Ok(plan)
}

/// Compute the consumer-facing package description.
pub fn package_info(
    recipe: &dyn Recipe,
    profile: &TargetProfile,
    features: &FeatureSet,
) -> Result<PackageInfo, ConfigError> {
    let resolved = resolve_features(recipe, profile, features)?;
    Ok(recipe.package_info(profile, &resolved))
}
