//! Implementation of `dockyard build`.
//!
//! A build runs four phases in order, each finishing before the next starts:
//! fetch, translate, execute and package.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::builder::recipe::{plan_resolved, resolve_features, PackageInfo, Recipe};
use crate::core::features::{FeatureSet, ResolvedFeatures};
use crate::core::settings::TargetProfile;
use crate::ops::execute::{execute_plan, ExecuteOptions};
use crate::ops::fetch::{fetch_source, FetchOptions, DEFAULT_TIMEOUT_SECS};
use crate::ops::package::package;
use crate::util::fs::remove_dir_all_if_exists;
use crate::util::hash::Fingerprint;
use crate::util::GlobalContext;

/// Options for the build command.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Number of parallel jobs (None = config, then available cores)
    pub jobs: Option<usize>,

    /// Package directory (None = under the configured output dir)
    pub out_dir: Option<PathBuf>,

    /// Keep the work directory after a successful build
    pub keep_work: bool,
}

/// Outcome of a successful build.
#[derive(Debug)]
pub struct BuildResult {
    pub package_dir: PathBuf,
    pub info: PackageInfo,
    /// Work directory, when it was kept
    pub work_dir: Option<PathBuf>,
    /// Expected library files the build did not produce
    pub missing: Vec<String>,
}

/// Fetch, build and package one recipe for one profile.
pub fn build(
    ctx: &GlobalContext,
    recipe: &dyn Recipe,
    profile: &TargetProfile,
    features: &FeatureSet,
    opts: &BuildOptions,
) -> Result<BuildResult> {
    let config = ctx.config();

    // Configuration errors surface before anything touches the disk.
    let resolved = resolve_features(recipe, profile, features)?;
    let plan = plan_resolved(recipe, profile, &resolved)?;

    let id = build_id(recipe, profile, &resolved);
    let work_dir = ctx
        .work_root()
        .join(format!("{}-{}-{}", recipe.name(), recipe.version(), id));
    let package_dir = opts
        .out_dir
        .clone()
        .unwrap_or_else(|| ctx.output_root().join(package_dir_name(recipe, profile, &id)));
    let jobs = resolve_jobs(opts.jobs, config.build.jobs);
    let keep_work = opts.keep_work || config.keep_work();

    tracing::info!("Building {} {} for {}", recipe.name(), recipe.version(), profile);
    tracing::debug!("work directory: {}", work_dir.display());

    remove_dir_all_if_exists(&work_dir)?;

    let fetch_opts = FetchOptions::new(ctx.download_cache_dir())
        .offline(config.offline())
        .timeout_secs(config.net.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));
    fetch_source(&recipe.source(profile), &work_dir, &fetch_opts)
        .with_context(|| format!("failed to fetch sources for {}", recipe.name()))?;

    let exec_opts = ExecuteOptions {
        jobs,
        verbose: ctx.is_verbose(),
    };
    if let Err(e) = execute_plan(&plan, &work_dir, &exec_opts) {
        tracing::info!("work directory kept for inspection: {}", work_dir.display());
        return Err(e);
    }

    let packaged = package(recipe, profile, &resolved, &work_dir, &package_dir)?;

    let work_dir = if keep_work {
        tracing::info!("Kept work directory {}", work_dir.display());
        Some(work_dir)
    } else {
        remove_dir_all_if_exists(&work_dir)?;
        None
    };

    Ok(BuildResult {
        package_dir: packaged.package_dir,
        info: packaged.info,
        work_dir,
        missing: packaged.missing,
    })
}

/// Identity of a build: recipe, version, profile and effective features.
pub fn build_id(recipe: &dyn Recipe, profile: &TargetProfile, features: &ResolvedFeatures) -> String {
    let mut fp = Fingerprint::new();
    fp.update_str(recipe.name())
        .update_str(recipe.version())
        .update_str(&profile.identity());
    for feature in features.iter() {
        fp.update_str(feature.name).update_bool(feature.enabled);
    }
    fp.finish_short()
}

/// Default package directory name: readable profile identity plus build id.
pub fn package_dir_name(recipe: &dyn Recipe, profile: &TargetProfile, build_id: &str) -> String {
    format!("{}-{}-{}-{}", recipe.name(), recipe.version(), profile.identity(), build_id)
}

/// Job count: command line, then configuration, then available cores.
///
/// A zero at either level counts as unset.
pub fn resolve_jobs(cli: Option<usize>, config: Option<usize>) -> usize {
    cli.filter(|&n| n > 0)
        .or(config.filter(|&n| n > 0))
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
}
