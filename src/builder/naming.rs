//! Artifact naming.
//!
//! Computes the exact file names a build produces so packaging can locate
//! them by name instead of guessing with globs. Names depend on the
//! platform's library conventions, the link kind and, for compilers with
//! ABI-tagged outputs, a suffix derived from runtime and build type.

use serde::Serialize;

use crate::core::settings::{BuildType, Compiler, MsvcRuntime, Os, TargetProfile};

/// Linkage of a produced library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Static,
    Shared,
}

impl LinkKind {
    pub fn from_shared(shared: bool) -> Self {
        if shared {
            LinkKind::Shared
        } else {
            LinkKind::Static
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::Static => "static",
            LinkKind::Shared => "shared",
        }
    }
}

/// Library file conventions of a target's linker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LibraryPlatform {
    /// `name.lib`, `name.dll` + import `name.lib`
    Msvc,
    /// `libname.a`, `name.dll` + import `libname.dll.a`
    MinGw,
    /// `libname.a`, `libname.so`
    Elf,
    /// `libname.a`, `libname.dylib`
    MachO,
}

impl LibraryPlatform {
    pub fn for_profile(profile: &TargetProfile) -> Self {
        match (profile.os, &profile.compiler) {
            (Os::Windows, Compiler::VisualStudio { .. }) => LibraryPlatform::Msvc,
            (Os::Windows, _) => LibraryPlatform::MinGw,
            (Os::Linux, _) => LibraryPlatform::Elf,
            (Os::Macos | Os::Ios, _) => LibraryPlatform::MachO,
        }
    }
}

/// Naming rules for the libraries of one build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactNamingScheme {
    pub platform: LibraryPlatform,
    pub kind: LinkKind,
    /// Prepended to the base name in link names
    pub link_prefix: String,
    /// Appended to the base name in link names
    pub link_suffix: String,
}

impl ArtifactNamingScheme {
    pub fn new(profile: &TargetProfile, kind: LinkKind) -> Self {
        ArtifactNamingScheme {
            platform: LibraryPlatform::for_profile(profile),
            kind,
            link_prefix: String::new(),
            link_suffix: String::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.link_prefix = prefix.into();
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.link_suffix = suffix.into();
        self
    }

    /// Name the host passes to its linker.
    pub fn link_name(&self, base: &str) -> String {
        format!("{}{}{}", self.link_prefix, base, self.link_suffix)
    }

    /// Exact files produced for a library, import libraries included.
    pub fn file_names(&self, base: &str) -> Vec<String> {
        let stem = self.link_name(base);
        match (self.platform, self.kind) {
            (LibraryPlatform::Msvc, LinkKind::Static) => vec![format!("{}.lib", stem)],
            (LibraryPlatform::Msvc, LinkKind::Shared) => {
                vec![format!("{}.dll", stem), format!("{}.lib", stem)]
            }
            (LibraryPlatform::MinGw, LinkKind::Static) => vec![format!("lib{}.a", stem)],
            (LibraryPlatform::MinGw, LinkKind::Shared) => {
                vec![format!("{}.dll", stem), format!("lib{}.dll.a", stem)]
            }
            (LibraryPlatform::Elf, LinkKind::Static) | (LibraryPlatform::MachO, LinkKind::Static) => {
                vec![format!("lib{}.a", stem)]
            }
            (LibraryPlatform::Elf, LinkKind::Shared) => vec![format!("lib{}.so", stem)],
            (LibraryPlatform::MachO, LinkKind::Shared) => vec![format!("lib{}.dylib", stem)],
        }
    }
}

/// ABI-tagged suffix of MSVC library names, e.g. `vc141-mt-sgd-1_64`.
///
/// The tag is built from `s` (static runtime) followed by `gd` (debug build),
/// and is omitted along with its dash when neither applies. The library
/// version keeps only its first two components.
pub fn msvc_abi_suffix(
    toolset_tag: &str,
    runtime: MsvcRuntime,
    build_type: BuildType,
    library_version: &str,
) -> String {
    let mut tags = String::new();
    if runtime.is_static() {
        tags.push('s');
    }
    if build_type.is_debug() {
        tags.push_str("gd");
    }

    let abi = if tags.is_empty() {
        String::new()
    } else {
        format!("-{}", tags)
    };

    let version = library_version
        .split('.')
        .take(2)
        .collect::<Vec<_>>()
        .join("_");

    format!("vc{}-mt{}-{}", toolset_tag, abi, version)
}
