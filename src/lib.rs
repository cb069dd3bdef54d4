//! Dockyard - build recipes for C/C++ libraries
//!
//! This crate provides the library half of dockyard: target settings and
//! feature validation, translation of both into native build tool
//! invocations, and the fetch/execute/package pipeline that runs them.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities for dockyard unit tests.
///
/// Only available when compiling tests. Provides profile fixtures and
/// temporary source trees.
#[cfg(test)]
pub mod test_support;

pub use builder::{translate, BuildPlan, Recipe, RecipeRegistry};
pub use crate::core::{ConfigError, FeatureSet, TargetProfile};
pub use util::context::GlobalContext;
