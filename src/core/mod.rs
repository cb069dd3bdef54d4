//! Core data structures for Dockyard.
//!
//! This module contains the inputs every recipe is translated from:
//! - Target settings (operating system, architecture, compiler, build type)
//! - Feature schemas and host-supplied feature sets
//! - Configuration errors

pub mod errors;
pub mod features;
pub mod settings;

pub use errors::ConfigError;
pub use features::{FeatureSchema, FeatureSet, ResolvedFeatures};
pub use settings::{
    Arch, BuildType, Compiler, CompilerVersion, CxxStdlib, MsvcRuntime, Os, ProfileSpec,
    TargetProfile,
};
