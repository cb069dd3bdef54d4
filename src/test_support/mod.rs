//! Test utilities for dockyard unit tests.
//!
//! Profiles are built through [`ProfileSpec`] so fixtures go through the
//! same validation as host input.
//!
//! # Example
//!
//! ```rust,ignore
//! use dockyard::test_support::{linux_gcc, TreeFixture};
//!
//! #[test]
//! fn test_example() {
//!     let profile = linux_gcc("7.2.0");
//!     let tree = TreeFixture::new().file("boost_1_64_0/boost/config.hpp", "");
//!     let tmp = tree.create();
//!     // ...
//! }
//! ```

pub mod fixtures;

use std::collections::BTreeMap;

use crate::core::settings::{CompilerSpec, ProfileSpec, TargetProfile};

pub use fixtures::*;

/// Build a profile from string settings, panicking on invalid input.
pub fn profile(
    os: &str,
    arch: &str,
    build_type: &str,
    compiler: &str,
    version: &str,
    runtime: Option<&str>,
    libcxx: Option<&str>,
) -> TargetProfile {
    let spec = ProfileSpec {
        os: Some(os.to_string()),
        arch: Some(arch.to_string()),
        build_type: Some(build_type.to_string()),
        compiler: CompilerSpec {
            name: Some(compiler.to_string()),
            version: Some(version.to_string()),
            runtime: runtime.map(str::to_string),
            libcxx: libcxx.map(str::to_string),
        },
        options: BTreeMap::new(),
    };

    spec.resolve()
        .unwrap_or_else(|e| panic!("invalid test profile: {}", e))
}

/// Linux x86_64 release with GCC and the C++11 ABI.
pub fn linux_gcc(version: &str) -> TargetProfile {
    profile(
        "linux",
        "x86_64",
        "Release",
        "gcc",
        version,
        None,
        Some("libstdc++11"),
    )
}

/// Windows x86_64 with Visual Studio 2017.
pub fn windows_msvc(runtime: &str, build_type: &str) -> TargetProfile {
    profile(
        "windows",
        "x86_64",
        build_type,
        "visual-studio",
        "15",
        Some(runtime),
        None,
    )
}

/// macOS x86_64 release with Apple Clang and libc++.
pub fn macos_apple_clang() -> TargetProfile {
    profile(
        "macos",
        "x86_64",
        "Release",
        "apple-clang",
        "9.0",
        None,
        Some("libc++"),
    )
}

/// iOS release with Apple Clang.
pub fn ios(arch: &str) -> TargetProfile {
    profile(
        "ios",
        arch,
        "Release",
        "apple-clang",
        "9.0",
        None,
        Some("libc++"),
    )
}
