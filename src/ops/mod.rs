//! High-level operations.
//!
//! This module contains the side-effecting half of dockyard: fetching
//! sources, running translated plans and assembling packages.

pub mod build;
pub mod execute;
pub mod fetch;
pub mod package;

pub use build::{build, BuildOptions, BuildResult};
pub use execute::{execute_plan, BuildToolError, ExecuteOptions};
pub use fetch::{fetch_source, FetchOptions};
pub use package::{package, read_manifest, PackageResult, MANIFEST_FILE};
