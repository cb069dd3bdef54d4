//! Target settings.
//!
//! A [`TargetProfile`] describes the platform a recipe is built for: operating
//! system, architecture, compiler and build type. Profiles arrive from the
//! host as string-typed [`ProfileSpec`] values (CLI flags or a TOML profile
//! file) and are resolved into closed enums, so every platform dispatch in the
//! recipes is an exhaustive `match`.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::errors::ConfigError;

/// Target operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Windows,
    Linux,
    Macos,
    Ios,
}

impl Os {
    /// Detect the host operating system.
    pub fn host() -> Option<Self> {
        match std::env::consts::OS {
            "windows" => Some(Os::Windows),
            "linux" => Some(Os::Linux),
            "macos" => Some(Os::Macos),
            "ios" => Some(Os::Ios),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Os::Windows => "windows",
            Os::Linux => "linux",
            Os::Macos => "macos",
            Os::Ios => "ios",
        }
    }

    /// Whether the platform belongs to the Apple family.
    pub fn is_apple(&self) -> bool {
        matches!(self, Os::Macos | Os::Ios)
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Os {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "windows" | "win" | "win32" => Ok(Os::Windows),
            "linux" => Ok(Os::Linux),
            "macos" | "osx" | "darwin" => Ok(Os::Macos),
            "ios" => Ok(Os::Ios),
            _ => Err(ConfigError::invalid_setting(
                "os",
                s,
                &["windows", "linux", "macos", "ios"],
            )),
        }
    }
}

/// Target CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Arch {
    #[serde(rename = "x86")]
    X86,
    #[serde(rename = "x86_64")]
    X86_64,
    #[serde(rename = "armv7")]
    Armv7,
    #[serde(rename = "armv7s")]
    Armv7s,
    #[serde(rename = "arm64")]
    Arm64,
}

impl Arch {
    /// Detect the host architecture.
    pub fn host() -> Option<Self> {
        match std::env::consts::ARCH {
            "x86" => Some(Arch::X86),
            "x86_64" => Some(Arch::X86_64),
            "aarch64" => Some(Arch::Arm64),
            "arm" => Some(Arch::Armv7),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::X86 => "x86",
            Arch::X86_64 => "x86_64",
            Arch::Armv7 => "armv7",
            Arch::Armv7s => "armv7s",
            Arch::Arm64 => "arm64",
        }
    }

    pub fn is_arm(&self) -> bool {
        matches!(self, Arch::Armv7 | Arch::Armv7s | Arch::Arm64)
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "x86" | "i386" | "i686" => Ok(Arch::X86),
            "x86_64" | "amd64" | "x64" => Ok(Arch::X86_64),
            "armv7" => Ok(Arch::Armv7),
            "armv7s" => Ok(Arch::Armv7s),
            "arm64" | "armv8" | "aarch64" => Ok(Arch::Arm64),
            _ => Err(ConfigError::invalid_setting(
                "arch",
                s,
                &["x86", "x86_64", "armv7", "armv7s", "arm64"],
            )),
        }
    }
}

/// Build type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BuildType {
    Debug,
    #[default]
    Release,
}

impl BuildType {
    /// Capitalized name, as CMake and multi-config generators expect it.
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Debug => "Debug",
            BuildType::Release => "Release",
        }
    }

    pub fn is_debug(&self) -> bool {
        matches!(self, BuildType::Debug)
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(BuildType::Debug),
            "release" => Ok(BuildType::Release),
            _ => Err(ConfigError::invalid_setting(
                "build_type",
                s,
                &["Debug", "Release"],
            )),
        }
    }
}

/// MSVC runtime library selection.
///
/// This controls the /MD vs /MT flag for MSVC builds and is baked into
/// the ABI tag of produced library names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MsvcRuntime {
    /// Dynamic CRT (/MD)
    MD,
    /// Static CRT (/MT)
    MT,
    /// Dynamic debug CRT (/MDd)
    MDd,
    /// Static debug CRT (/MTd)
    MTd,
}

impl MsvcRuntime {
    pub fn as_str(&self) -> &'static str {
        match self {
            MsvcRuntime::MD => "MD",
            MsvcRuntime::MT => "MT",
            MsvcRuntime::MDd => "MDd",
            MsvcRuntime::MTd => "MTd",
        }
    }

    /// Get the compiler flag for this runtime.
    pub fn as_flag(&self) -> String {
        format!("/{}", self.as_str())
    }

    /// Whether the C runtime is linked statically.
    pub fn is_static(&self) -> bool {
        matches!(self, MsvcRuntime::MT | MsvcRuntime::MTd)
    }

    /// Value for `CMAKE_MSVC_RUNTIME_LIBRARY`.
    pub fn cmake_runtime_library(&self) -> &'static str {
        match self {
            MsvcRuntime::MD => "MultiThreadedDLL",
            MsvcRuntime::MT => "MultiThreaded",
            MsvcRuntime::MDd => "MultiThreadedDebugDLL",
            MsvcRuntime::MTd => "MultiThreadedDebug",
        }
    }
}

impl fmt::Display for MsvcRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MsvcRuntime {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_start_matches('/').to_lowercase().as_str() {
            "md" => Ok(MsvcRuntime::MD),
            "mt" => Ok(MsvcRuntime::MT),
            "mdd" => Ok(MsvcRuntime::MDd),
            "mtd" => Ok(MsvcRuntime::MTd),
            _ => Err(ConfigError::invalid_setting(
                "compiler.runtime",
                s,
                &["MD", "MT", "MDd", "MTd"],
            )),
        }
    }
}

/// C++ standard library variant (non-MSVC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CxxStdlib {
    /// GNU libstdc++ with the pre-C++11 ABI
    #[serde(rename = "libstdc++")]
    Libstdcxx,
    /// GNU libstdc++ with the C++11 ABI
    #[serde(rename = "libstdc++11")]
    Libstdcxx11,
    /// LLVM libc++
    #[serde(rename = "libc++")]
    Libcxx,
}

impl CxxStdlib {
    pub fn as_str(&self) -> &'static str {
        match self {
            CxxStdlib::Libstdcxx => "libstdc++",
            CxxStdlib::Libstdcxx11 => "libstdc++11",
            CxxStdlib::Libcxx => "libc++",
        }
    }

    /// Value for `_GLIBCXX_USE_CXX11_ABI`, if this is a libstdc++ variant.
    pub fn glibcxx_abi(&self) -> Option<u8> {
        match self {
            CxxStdlib::Libstdcxx => Some(0),
            CxxStdlib::Libstdcxx11 => Some(1),
            CxxStdlib::Libcxx => None,
        }
    }

    /// The `-stdlib=` flag understood by clang.
    pub fn stdlib_flag(&self) -> &'static str {
        match self {
            CxxStdlib::Libstdcxx | CxxStdlib::Libstdcxx11 => "-stdlib=libstdc++",
            CxxStdlib::Libcxx => "-stdlib=libc++",
        }
    }
}

impl fmt::Display for CxxStdlib {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CxxStdlib {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "libstdc++" => Ok(CxxStdlib::Libstdcxx),
            "libstdc++11" => Ok(CxxStdlib::Libstdcxx11),
            "libc++" => Ok(CxxStdlib::Libcxx),
            _ => Err(ConfigError::invalid_setting(
                "compiler.libcxx",
                s,
                &["libstdc++", "libstdc++11", "libc++"],
            )),
        }
    }
}

/// A compiler version as given by the host, with its parsed components.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct CompilerVersion {
    raw: String,
    major: u64,
}

impl CompilerVersion {
    /// Parse a version such as `15`, `4.9` or `7.2.0`.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        let padded = match trimmed.split('.').count() {
            1 => format!("{}.0.0", trimmed),
            2 => format!("{}.0", trimmed),
            _ => trimmed.to_string(),
        };

        let version = semver::Version::parse(&padded)
            .map_err(|_| ConfigError::invalid_setting("compiler.version", raw, &[]))?;

        Ok(CompilerVersion {
            raw: trimmed.to_string(),
            major: version.major,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn major(&self) -> u64 {
        self.major
    }
}

impl fmt::Display for CompilerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<CompilerVersion> for String {
    fn from(v: CompilerVersion) -> Self {
        v.raw
    }
}

impl TryFrom<String> for CompilerVersion {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        CompilerVersion::parse(&s)
    }
}

/// Compiler identity, with the settings that only make sense for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "name", rename_all = "kebab-case")]
pub enum Compiler {
    Gcc {
        version: CompilerVersion,
        libcxx: Option<CxxStdlib>,
    },
    Clang {
        version: CompilerVersion,
        libcxx: Option<CxxStdlib>,
    },
    AppleClang {
        version: CompilerVersion,
        libcxx: Option<CxxStdlib>,
    },
    VisualStudio {
        version: CompilerVersion,
        runtime: MsvcRuntime,
    },
}

impl Compiler {
    pub fn name(&self) -> &'static str {
        match self {
            Compiler::Gcc { .. } => "gcc",
            Compiler::Clang { .. } => "clang",
            Compiler::AppleClang { .. } => "apple-clang",
            Compiler::VisualStudio { .. } => "visual-studio",
        }
    }

    pub fn version(&self) -> &CompilerVersion {
        match self {
            Compiler::Gcc { version, .. }
            | Compiler::Clang { version, .. }
            | Compiler::AppleClang { version, .. }
            | Compiler::VisualStudio { version, .. } => version,
        }
    }

    pub fn libcxx(&self) -> Option<CxxStdlib> {
        match self {
            Compiler::Gcc { libcxx, .. }
            | Compiler::Clang { libcxx, .. }
            | Compiler::AppleClang { libcxx, .. } => *libcxx,
            Compiler::VisualStudio { .. } => None,
        }
    }

    pub fn runtime(&self) -> Option<MsvcRuntime> {
        match self {
            Compiler::VisualStudio { runtime, .. } => Some(*runtime),
            _ => None,
        }
    }

    pub fn is_msvc(&self) -> bool {
        matches!(self, Compiler::VisualStudio { .. })
    }

    pub fn is_clang_family(&self) -> bool {
        matches!(self, Compiler::Clang { .. } | Compiler::AppleClang { .. })
    }

    /// Whether the compiler links its C runtime statically.
    pub fn has_static_runtime(&self) -> bool {
        self.runtime().is_some_and(|rt| rt.is_static())
    }
}

impl fmt::Display for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.name(), self.version())?;
        if let Some(rt) = self.runtime() {
            write!(f, "-{}", rt)?;
        }
        if let Some(libcxx) = self.libcxx() {
            write!(f, "-{}", libcxx)?;
        }
        Ok(())
    }
}

/// A fully resolved, internally consistent target description.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TargetProfile {
    pub os: Os,
    pub arch: Arch,
    pub compiler: Compiler,
    pub build_type: BuildType,
}

impl TargetProfile {
    pub fn is_debug(&self) -> bool {
        self.build_type.is_debug()
    }

    /// Stable textual identity, used for work directory names and fingerprints.
    pub fn identity(&self) -> String {
        format!(
            "{}-{}-{}-{}",
            self.os,
            self.arch,
            self.compiler,
            self.build_type.as_str().to_lowercase()
        )
    }
}

impl fmt::Display for TargetProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.os, self.arch, self.compiler, self.build_type
        )
    }
}

/// Compiler section of a profile file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerSpec {
    pub name: Option<String>,
    pub version: Option<String>,
    pub runtime: Option<String>,
    pub libcxx: Option<String>,
}

/// Unresolved profile as supplied by the host.
///
/// ```toml
/// os = "windows"
/// arch = "x86_64"
/// build_type = "Debug"
///
/// [compiler]
/// name = "visual-studio"
/// version = "15"
/// runtime = "MTd"
///
/// [options]
/// shared = false
/// filesystem = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSpec {
    pub os: Option<String>,
    pub arch: Option<String>,
    pub build_type: Option<String>,
    pub compiler: CompilerSpec,
    /// Feature assignments carried alongside the settings
    pub options: BTreeMap<String, bool>,
}

impl ProfileSpec {
    /// Load a profile file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read profile: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse profile: {}", path.display()))
    }

    /// Fill unset os/arch/build type from the host.
    pub fn with_host_defaults(mut self) -> Self {
        if self.os.is_none() {
            self.os = Os::host().map(|os| os.as_str().to_string());
        }
        if self.arch.is_none() {
            self.arch = Arch::host().map(|arch| arch.as_str().to_string());
        }
        if self.build_type.is_none() {
            self.build_type = Some(BuildType::default().as_str().to_string());
        }
        self
    }

    /// Merge another spec into this one (other takes precedence).
    pub fn merge(&mut self, other: ProfileSpec) {
        if other.os.is_some() {
            self.os = other.os;
        }
        if other.arch.is_some() {
            self.arch = other.arch;
        }
        if other.build_type.is_some() {
            self.build_type = other.build_type;
        }
        if other.compiler.name.is_some() {
            self.compiler.name = other.compiler.name;
        }
        if other.compiler.version.is_some() {
            self.compiler.version = other.compiler.version;
        }
        if other.compiler.runtime.is_some() {
            self.compiler.runtime = other.compiler.runtime;
        }
        if other.compiler.libcxx.is_some() {
            self.compiler.libcxx = other.compiler.libcxx;
        }
        self.options.extend(other.options);
    }

    /// Resolve into a typed, validated profile.
    pub fn resolve(&self) -> Result<TargetProfile, ConfigError> {
        let os: Os = required(&self.os, "os")?.parse()?;
        let arch: Arch = required(&self.arch, "arch")?.parse()?;
        let build_type: BuildType = match &self.build_type {
            Some(bt) => bt.parse()?,
            None => BuildType::default(),
        };
        let compiler = self.resolve_compiler()?;

        validate(os, arch, &compiler)?;

        Ok(TargetProfile {
            os,
            arch,
            compiler,
            build_type,
        })
    }

    fn resolve_compiler(&self) -> Result<Compiler, ConfigError> {
        let spec = &self.compiler;
        let name = required(&spec.name, "compiler")?;
        let version = CompilerVersion::parse(required(&spec.version, "compiler.version")?)?;

        let libcxx = spec
            .libcxx
            .as_deref()
            .map(CxxStdlib::from_str)
            .transpose()?;

        let compiler = match name.to_lowercase().as_str() {
            "gcc" => Compiler::Gcc { version, libcxx },
            "clang" => Compiler::Clang { version, libcxx },
            "apple-clang" | "appleclang" => Compiler::AppleClang { version, libcxx },
            "visual-studio" | "visual studio" | "msvc" | "vs" => {
                if libcxx.is_some() {
                    return Err(ConfigError::inconsistent(
                        "`compiler.libcxx` does not apply to Visual Studio",
                    ));
                }
                let runtime = required(&spec.runtime, "compiler.runtime")?.parse()?;
                return Ok(Compiler::VisualStudio { version, runtime });
            }
            _ => {
                return Err(ConfigError::invalid_setting(
                    "compiler",
                    name,
                    &["gcc", "clang", "apple-clang", "visual-studio"],
                ))
            }
        };

        if spec.runtime.is_some() {
            return Err(ConfigError::inconsistent(format!(
                "`compiler.runtime` only applies to Visual Studio, not {}",
                compiler.name()
            )));
        }

        Ok(compiler)
    }
}

fn required<'a>(value: &'a Option<String>, setting: &str) -> Result<&'a str, ConfigError> {
    value.as_deref().ok_or_else(|| ConfigError::MissingSetting {
        setting: setting.to_string(),
    })
}

fn validate(os: Os, arch: Arch, compiler: &Compiler) -> Result<(), ConfigError> {
    if os == Os::Ios && !arch.is_arm() {
        return Err(ConfigError::inconsistent(format!(
            "iOS targets must use an ARM architecture (armv7, armv7s, arm64), got {}",
            arch
        )));
    }

    match compiler {
        Compiler::VisualStudio { .. } if os != Os::Windows => Err(ConfigError::inconsistent(
            format!("Visual Studio can only target windows, got {}", os),
        )),
        Compiler::AppleClang { .. } if !os.is_apple() => Err(ConfigError::inconsistent(
            format!("apple-clang can only target macos or ios, got {}", os),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(os: &str, arch: &str, compiler: &str, version: &str) -> ProfileSpec {
        ProfileSpec {
            os: Some(os.to_string()),
            arch: Some(arch.to_string()),
            build_type: Some("Release".to_string()),
            compiler: CompilerSpec {
                name: Some(compiler.to_string()),
                version: Some(version.to_string()),
                ..Default::default()
            },
            options: BTreeMap::new(),
        }
    }

    #[test]
    fn test_compiler_version_parse() {
        let v = CompilerVersion::parse("7.2.0").unwrap();
        assert_eq!(v.major(), 7);
        assert_eq!(v.as_str(), "7.2.0");

        let v = CompilerVersion::parse("15").unwrap();
        assert_eq!(v.major(), 15);

        let v = CompilerVersion::parse("4.9").unwrap();
        assert_eq!(v.major(), 4);

        assert!(CompilerVersion::parse("latest").is_err());
    }

    #[test]
    fn test_resolve_gcc_profile() {
        let mut s = spec("Linux", "x86_64", "gcc", "7.2.0");
        s.compiler.libcxx = Some("libstdc++11".to_string());

        let profile = s.resolve().unwrap();
        assert_eq!(profile.os, Os::Linux);
        assert_eq!(profile.arch, Arch::X86_64);
        assert_eq!(profile.compiler.name(), "gcc");
        assert_eq!(profile.compiler.libcxx(), Some(CxxStdlib::Libstdcxx11));
        assert!(!profile.is_debug());
    }

    #[test]
    fn test_visual_studio_requires_runtime() {
        let s = spec("Windows", "x86_64", "Visual Studio", "15");
        let err = s.resolve().unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingSetting {
                setting: "compiler.runtime".to_string()
            }
        );
    }

    #[test]
    fn test_visual_studio_runtime() {
        let mut s = spec("Windows", "x86", "visual-studio", "15");
        s.compiler.runtime = Some("MTd".to_string());

        let profile = s.resolve().unwrap();
        assert_eq!(profile.compiler.runtime(), Some(MsvcRuntime::MTd));
        assert!(profile.compiler.has_static_runtime());
    }

    #[test]
    fn test_runtime_rejected_for_gcc() {
        let mut s = spec("Linux", "x86_64", "gcc", "7");
        s.compiler.runtime = Some("MT".to_string());
        assert!(matches!(
            s.resolve(),
            Err(ConfigError::InconsistentProfile { .. })
        ));
    }

    #[test]
    fn test_ios_requires_arm() {
        let s = spec("iOS", "x86_64", "apple-clang", "9.0");
        assert!(matches!(
            s.resolve(),
            Err(ConfigError::InconsistentProfile { .. })
        ));

        let s = spec("iOS", "armv7s", "apple-clang", "9.0");
        assert_eq!(s.resolve().unwrap().arch, Arch::Armv7s);
    }

    #[test]
    fn test_visual_studio_only_on_windows() {
        let mut s = spec("Linux", "x86_64", "visual-studio", "15");
        s.compiler.runtime = Some("MD".to_string());
        assert!(matches!(
            s.resolve(),
            Err(ConfigError::InconsistentProfile { .. })
        ));
    }

    #[test]
    fn test_missing_compiler() {
        let mut s = spec("Linux", "x86_64", "gcc", "7");
        s.compiler.name = None;
        assert_eq!(
            s.resolve().unwrap_err(),
            ConfigError::MissingSetting {
                setting: "compiler".to_string()
            }
        );
    }

    #[test]
    fn test_merge_prefers_other() {
        let mut base = spec("Linux", "x86_64", "gcc", "7");
        base.options.insert("shared".to_string(), true);

        let mut other = ProfileSpec::default();
        other.compiler.name = Some("clang".to_string());
        other.compiler.version = Some("5.0".to_string());
        other.options.insert("shared".to_string(), false);

        base.merge(other);

        assert_eq!(base.os.as_deref(), Some("Linux"));
        assert_eq!(base.compiler.name.as_deref(), Some("clang"));
        assert_eq!(base.options.get("shared"), Some(&false));
    }

    #[test]
    fn test_profile_file_load() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("msvc.toml");
        std::fs::write(
            &path,
            r#"
os = "windows"
arch = "x86_64"
build_type = "Debug"

[compiler]
name = "visual-studio"
version = "15"
runtime = "MTd"

[options]
shared = true
filesystem = true
"#,
        )
        .unwrap();

        let spec = ProfileSpec::load(&path).unwrap();
        assert_eq!(spec.options.get("filesystem"), Some(&true));

        let profile = spec.resolve().unwrap();
        assert_eq!(profile.build_type, BuildType::Debug);
        assert_eq!(profile.compiler.runtime(), Some(MsvcRuntime::MTd));
    }

    #[test]
    fn test_profile_identity_is_stable() {
        let profile = spec("Linux", "x86_64", "gcc", "7.2.0").resolve().unwrap();
        assert_eq!(profile.identity(), "linux-x86_64-gcc-7.2.0-release");
    }
}
