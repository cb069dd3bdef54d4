//! Toolset selection.
//!
//! Maps a compiler identity to the identifiers upstream build tools expect.
//! Some tools only care about major-version compatibility, so several of
//! these mappings deliberately drop the minor and patch components.

use crate::core::settings::{Arch, Compiler, CompilerVersion};

/// b2 `toolset=` value, or `None` to let bootstrap's choice apply.
///
/// GCC only needs the major version, otherwise Boost.Build does not find
/// the compiler.
pub fn b2_toolset(compiler: &Compiler) -> Option<String> {
    match compiler {
        Compiler::Gcc { version, .. } => Some(format!("gcc-{}", version.major())),
        Compiler::Clang { version, .. } => Some(format!("clang-{}", version)),
        Compiler::AppleClang { .. } => None,
        Compiler::VisualStudio { version, .. } => {
            Some(format!("msvc-{}", msvc_toolset_version(version)))
        }
    }
}

/// `--with-toolset=` value for Boost's `bootstrap.sh`.
pub fn bootstrap_toolset(compiler: &Compiler) -> &'static str {
    match compiler {
        Compiler::Gcc { .. } => "gcc",
        Compiler::Clang { .. } | Compiler::AppleClang { .. } => "clang",
        Compiler::VisualStudio { .. } => "msvc",
    }
}

/// MSVC platform toolset version for a Visual Studio release (`15` -> `14.1`).
pub fn msvc_toolset_version(version: &CompilerVersion) -> String {
    match version.major() {
        15 => "14.1".to_string(),
        16 => "14.2".to_string(),
        17 => "14.3".to_string(),
        n => format!("{}.0", n),
    }
}

/// Toolset digits used in library names (`15` -> `141`).
pub fn msvc_toolset_tag(version: &CompilerVersion) -> String {
    msvc_toolset_version(version).replace('.', "")
}

/// CMake Visual Studio generator name for a release.
pub fn cmake_vs_generator(version: &CompilerVersion) -> Option<&'static str> {
    match version.major() {
        10 => Some("Visual Studio 10 2010"),
        11 => Some("Visual Studio 11 2012"),
        12 => Some("Visual Studio 12 2013"),
        14 => Some("Visual Studio 14 2015"),
        15 => Some("Visual Studio 15 2017"),
        16 => Some("Visual Studio 16 2019"),
        17 => Some("Visual Studio 17 2022"),
        _ => None,
    }
}

/// CMake `-A` platform name for Visual Studio generators.
pub fn cmake_vs_platform(arch: Arch) -> &'static str {
    match arch {
        Arch::X86 => "Win32",
        Arch::X86_64 => "x64",
        Arch::Armv7 | Arch::Armv7s => "ARM",
        Arch::Arm64 => "ARM64",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::settings::MsvcRuntime;

    fn version(v: &str) -> CompilerVersion {
        CompilerVersion::parse(v).unwrap()
    }

    #[test]
    fn test_gcc_toolset_uses_major_only() {
        let gcc = Compiler::Gcc {
            version: version("7.2.0"),
            libcxx: None,
        };
        assert_eq!(b2_toolset(&gcc).as_deref(), Some("gcc-7"));

        let gcc10 = Compiler::Gcc {
            version: version("10.3"),
            libcxx: None,
        };
        assert_eq!(b2_toolset(&gcc10).as_deref(), Some("gcc-10"));
    }

    #[test]
    fn test_clang_toolset_keeps_version() {
        let clang = Compiler::Clang {
            version: version("5.0"),
            libcxx: None,
        };
        assert_eq!(b2_toolset(&clang).as_deref(), Some("clang-5.0"));
    }

    #[test]
    fn test_apple_clang_has_no_toolset() {
        let apple = Compiler::AppleClang {
            version: version("9.0"),
            libcxx: None,
        };
        assert_eq!(b2_toolset(&apple), None);
        assert_eq!(bootstrap_toolset(&apple), "clang");
    }

    #[test]
    fn test_msvc_toolset_versions() {
        assert_eq!(msvc_toolset_version(&version("15")), "14.1");
        assert_eq!(msvc_toolset_version(&version("14")), "14.0");
        assert_eq!(msvc_toolset_version(&version("12")), "12.0");
        assert_eq!(msvc_toolset_tag(&version("15")), "141");

        let vs = Compiler::VisualStudio {
            version: version("15"),
            runtime: MsvcRuntime::MD,
        };
        assert_eq!(b2_toolset(&vs).as_deref(), Some("msvc-14.1"));
    }

    #[test]
    fn test_cmake_generator() {
        assert_eq!(
            cmake_vs_generator(&version("15")),
            Some("Visual Studio 15 2017")
        );
        assert_eq!(cmake_vs_generator(&version("9")), None);
        assert_eq!(cmake_vs_platform(Arch::X86), "Win32");
    }
}
