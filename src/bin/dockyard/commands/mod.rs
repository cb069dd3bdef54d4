//! Command implementations

pub mod build;
pub mod completions;
pub mod info;
pub mod list;
pub mod options;
pub mod plan;

use anyhow::Result;

use crate::cli::ProfileArgs;
use dockyard::core::features::FeatureSet;
use dockyard::core::settings::{CompilerSpec, ProfileSpec, TargetProfile};

/// Flags that apply to every command.
pub struct GlobalArgs {
    pub verbose: bool,
}

/// Resolve the profile and feature set from a profile file and flags.
///
/// Flags override the file; unset os, arch and build type default to the
/// host. `-o` assignments override the file's `[options]`.
pub fn load_profile(args: &ProfileArgs) -> Result<(TargetProfile, FeatureSet)> {
    let mut spec = match args.profile {
        Some(ref path) => ProfileSpec::load(path)?,
        None => ProfileSpec::default(),
    };

    spec.merge(ProfileSpec {
        os: args.os.clone(),
        arch: args.arch.clone(),
        build_type: args.build_type.clone(),
        compiler: CompilerSpec {
            name: args.compiler.clone(),
            version: args.compiler_version.clone(),
            runtime: args.runtime.clone(),
            libcxx: args.libcxx.clone(),
        },
        options: Default::default(),
    });

    let spec = spec.with_host_defaults();
    let profile = spec.resolve()?;

    let mut features = FeatureSet::from(spec.options);
    features.merge(&FeatureSet::from_assignments(&args.options)?);

    Ok((profile, features))
}
