//! Build configuration translation.
//!
//! This module turns a target profile and a feature set into an ordered
//! plan of build tool invocations, one recipe per upstream library.

pub mod command;
pub mod naming;
pub mod plan;
pub mod recipe;
pub mod recipes;
pub mod registry;
pub mod toolset;

pub use command::CommandSpec;
pub use naming::{ArtifactNamingScheme, LinkKind};
pub use plan::{BuildPlan, BuildStep};
pub use recipe::{package_info, translate, PackageInfo, Recipe, SourceSpec};
pub use registry::RecipeRegistry;
