//! Crypto++ 5.6.5.
//!
//! Desktop targets go through the upstream CMake project. iOS has no CMake
//! support at this revision, so each architecture is built with the cross
//! makefile and the results are merged with `lipo`.

use std::path::PathBuf;

use crate::builder::command::CommandSpec;
use crate::builder::naming::{ArtifactNamingScheme, LinkKind};
use crate::builder::plan::{BuildPlan, JobsFlag, RunStep};
use crate::builder::recipe::{CopyRule, PackageInfo, Recipe, SourceSpec};
use crate::builder::toolset::{cmake_vs_generator, cmake_vs_platform};
use crate::core::errors::ConfigError;
use crate::core::features::{FeatureSchema, ResolvedFeatures};
use crate::core::settings::{Arch, Compiler, Os, TargetProfile};

const VERSION: &str = "5.6.5";
const GIT_URL: &str = "https://github.com/weidai11/cryptopp.git";
const GIT_REV: &str = "aaf62695fc03bf941ec51e40a139f5e0eb8652f3";
const SOURCE_DIR: &str = "cryptopp";
const BUILD_DIR: &str = "build";

const IOS_ARCHES: [Arch; 3] = [Arch::Armv7, Arch::Armv7s, Arch::Arm64];
const IOS_CXXFLAGS: &str = "-DNDEBUG -g2 -O3 -fPIC -pipe -fembed-bitcode";

/// Feature name to CMake definition.
const DEFINITIONS: &[(&str, &str)] = &[
    ("disable_asm", "DISABLE_ASM"),
    ("disable_sse3", "DISABLE_SSSE3"),
    ("disable_sse4", "DISABLE_SSE4"),
    ("disable_aesni", "DISABLE_AESNI"),
    ("disable_sha", "DISABLE_SHA"),
    ("native_arch", "CRYPTOPP_NATIVE_ARCH"),
];

fn on_off(value: bool) -> &'static str {
    if value {
        "ON"
    } else {
        "OFF"
    }
}

pub struct CryptoPP;

impl CryptoPP {
    /// `-D` tokens for toggles the host set; unset toggles keep CMake's default.
    fn definition_flags(features: &ResolvedFeatures) -> Vec<String> {
        DEFINITIONS
            .iter()
            .filter_map(|(feature, definition)| {
                features
                    .explicit(feature)
                    .map(|value| format!("-D{}={}", definition, on_off(value)))
            })
            .collect()
    }

    fn cxx_flags(profile: &TargetProfile) -> Vec<String> {
        let mut flags = Vec::new();

        if profile.compiler.is_msvc() {
            return flags;
        }

        if profile.arch == Arch::X86 {
            flags.push("-m32".to_string());
        }

        if let Some(libcxx) = profile.compiler.libcxx() {
            if profile.compiler.is_clang_family() {
                flags.push(libcxx.stdlib_flag().to_string());
            }
            if let Some(abi) = libcxx.glibcxx_abi() {
                flags.push(format!("-D_GLIBCXX_USE_CXX11_ABI={}", abi));
            }
        }

        flags
    }

    fn cmake_plan(
        &self,
        plan: &mut BuildPlan,
        profile: &TargetProfile,
        features: &ResolvedFeatures,
    ) -> Result<(), ConfigError> {
        let shared = features.enabled("shared");

        let mut configure = CommandSpec::new("cmake").args(["-S", SOURCE_DIR, "-B", BUILD_DIR]);

        if let Compiler::VisualStudio { version, runtime } = &profile.compiler {
            let generator = cmake_vs_generator(version).ok_or_else(|| ConfigError::Unsupported {
                recipe: self.name().to_string(),
                what: format!("Visual Studio {} (no known CMake generator)", version),
            })?;

            configure = configure
                .args(["-G", generator, "-A", cmake_vs_platform(profile.arch)])
                .arg("-DCMAKE_POLICY_DEFAULT_CMP0091=NEW")
                .arg(format!(
                    "-DCMAKE_MSVC_RUNTIME_LIBRARY={}",
                    runtime.cmake_runtime_library()
                ));
        }

        configure = configure
            .arg(format!("-DCMAKE_BUILD_TYPE={}", profile.build_type))
            .arg_if(
                profile.os != Os::Windows,
                "-DCMAKE_POSITION_INDEPENDENT_CODE=ON",
            );

        let cxx_flags = Self::cxx_flags(profile);
        if !cxx_flags.is_empty() {
            configure = configure.arg(format!("-DCMAKE_CXX_FLAGS={}", cxx_flags.join(" ")));
        }

        let feature_flags = Self::definition_flags(features);
        configure = configure
            .args(feature_flags.iter().cloned())
            .arg(format!("-DBUILD_SHARED={}", on_off(shared)))
            .arg(format!("-DBUILD_STATIC={}", on_off(!shared)));

        let build = CommandSpec::new("cmake")
            .args(["--build", BUILD_DIR, "--config", profile.build_type.as_str()]);

        plan.run(RunStep::new("configure", ".", configure))
            .run(RunStep::new("build", ".", build).with_jobs(JobsFlag::Separate("--parallel")));
        plan.feature_flags = feature_flags;

        Ok(())
    }

    fn ios_plan(&self, plan: &mut BuildPlan, features: &ResolvedFeatures) {
        if let Some(ignored) = DEFINITIONS
            .iter()
            .map(|(feature, _)| *feature)
            .find(|feature| features.explicit(feature).is_some())
        {
            tracing::debug!("cryptopp: `{}` has no effect on iOS builds", ignored);
        }

        plan.env("CXXFLAGS", IOS_CXXFLAGS).patch(
            format!("{}/setenv-ios.sh", SOURCE_DIR),
            " == ",
            " = ",
        );

        for arch in IOS_ARCHES {
            let script = format!(
                ". ./setenv-ios.sh {} && make clean && make -f GNUmakefile-cross",
                arch
            );
            plan.run(RunStep::new(
                format!("make-{}", arch),
                SOURCE_DIR,
                CommandSpec::new("sh").args(["-c", script.as_str()]),
            ))
            .rename(
                format!("{}/libcryptopp.a", SOURCE_DIR),
                format!("{}/libcryptopp-{}.a", SOURCE_DIR, arch),
                false,
            );
        }

        let lipo = CommandSpec::new("lipo")
            .arg("-create")
            .args(IOS_ARCHES.iter().map(|arch| format!("./libcryptopp-{}.a", arch)))
            .args(["-output", "./libcryptopp.a"]);
        plan.run(RunStep::new("lipo", SOURCE_DIR, lipo));
    }
}

impl Recipe for CryptoPP {
    fn name(&self) -> &'static str {
        "cryptopp"
    }

    fn version(&self) -> &'static str {
        VERSION
    }

    fn description(&self) -> &'static str {
        "Crypto++ class library of cryptographic schemes"
    }

    fn license(&self) -> &'static str {
        "BSL-1.0"
    }

    fn features(&self, _profile: &TargetProfile) -> FeatureSchema {
        FeatureSchema::new("cryptopp")
            .feature("shared", false, "Build a shared library")
            .feature("disable_asm", false, "Disable inline assembly")
            .feature("disable_sse3", false, "Disable SSSE3 code paths")
            .feature("disable_sse4", false, "Disable SSE4 code paths")
            .feature("disable_aesni", false, "Disable AES-NI code paths")
            .feature("disable_sha", false, "Disable SHA extension code paths")
            .feature("native_arch", false, "Optimize for the build machine's CPU")
    }

    fn source(&self, _profile: &TargetProfile) -> SourceSpec {
        SourceSpec::Git {
            url: GIT_URL.to_string(),
            rev: GIT_REV.to_string(),
            dest: PathBuf::from(SOURCE_DIR),
        }
    }

    fn source_dir(&self, _profile: &TargetProfile) -> PathBuf {
        PathBuf::from(SOURCE_DIR)
    }

    fn plan(
        &self,
        profile: &TargetProfile,
        features: &ResolvedFeatures,
    ) -> Result<BuildPlan, ConfigError> {
        let mut plan = BuildPlan::new(self.name(), VERSION, profile.identity(), SOURCE_DIR);

        match profile.os {
            Os::Ios => self.ios_plan(&mut plan, features),
            Os::Windows | Os::Linux | Os::Macos => self.cmake_plan(&mut plan, profile, features)?,
        }

        Ok(plan)
    }

    fn naming(&self, profile: &TargetProfile, features: &ResolvedFeatures) -> ArtifactNamingScheme {
        let shared = features.enabled("shared");
        let naming = ArtifactNamingScheme::new(profile, LinkKind::from_shared(shared));

        if profile.compiler.is_msvc() && !shared {
            naming.with_suffix("-static")
        } else {
            naming
        }
    }

    fn package_rules(&self, profile: &TargetProfile, _features: &ResolvedFeatures) -> Vec<CopyRule> {
        let mut rules = vec![CopyRule::new("*.h", SOURCE_DIR, "include/cryptopp")];

        if profile.os == Os::Ios {
            rules.push(CopyRule::new("libcryptopp.a", SOURCE_DIR, "lib").flatten());
            return rules;
        }

        for pattern in ["*.lib", "*.a", "*.so"] {
            rules.push(CopyRule::new(pattern, BUILD_DIR, "lib").flatten());
        }
        for pattern in ["*.dll", "*.dylib"] {
            rules.push(CopyRule::new(pattern, BUILD_DIR, "bin").flatten());
        }

        rules
    }

    fn package_info(&self, profile: &TargetProfile, features: &ResolvedFeatures) -> PackageInfo {
        PackageInfo::new(self, profile, features)
            .with_libs(&self.naming(profile, features), ["cryptopp"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::plan::BuildStep;
    use crate::builder::recipe::{package_info, translate};
    use crate::core::features::FeatureSet;
    use crate::test_support::{ios, linux_gcc, profile, windows_msvc};

    fn configure_args(plan: &BuildPlan) -> Vec<String> {
        plan.run_step("configure").unwrap().command.args.clone()
    }

    #[test]
    fn test_linux_defaults() {
        let plan = translate(&CryptoPP, &linux_gcc("7.2.0"), &FeatureSet::new()).unwrap();

        assert_eq!(
            configure_args(&plan),
            vec![
                "-S",
                "cryptopp",
                "-B",
                "build",
                "-DCMAKE_BUILD_TYPE=Release",
                "-DCMAKE_POSITION_INDEPENDENT_CODE=ON",
                "-DCMAKE_CXX_FLAGS=-D_GLIBCXX_USE_CXX11_ABI=1",
                "-DBUILD_SHARED=OFF",
                "-DBUILD_STATIC=ON",
            ]
        );
        assert!(plan.feature_flags.is_empty());

        let build = plan.run_step("build").unwrap();
        assert_eq!(
            build.command_with_jobs(6).tokens(),
            vec!["cmake", "--build", "build", "--config", "Release", "--parallel", "6"]
        );
    }

    #[test]
    fn test_explicit_toggles_only() {
        let features = FeatureSet::new()
            .with("disable_asm", false)
            .with("disable_sse3", true)
            .with("native_arch", true);
        let plan = translate(&CryptoPP, &linux_gcc("7.2.0"), &features).unwrap();

        assert_eq!(
            plan.feature_flags,
            vec![
                "-DDISABLE_ASM=OFF",
                "-DDISABLE_SSSE3=ON",
                "-DCRYPTOPP_NATIVE_ARCH=ON"
            ]
        );
        let args = configure_args(&plan);
        assert!(args.contains(&"-DDISABLE_SSSE3=ON".to_string()));
        assert!(!args.iter().any(|a| a.starts_with("-DDISABLE_SHA")));
    }

    #[test]
    fn test_visual_studio_generator_and_runtime() {
        let features = FeatureSet::new().with("shared", true);
        let plan = translate(&CryptoPP, &windows_msvc("MDd", "Debug"), &features).unwrap();
        let args = configure_args(&plan);

        assert_eq!(
            &args[4..10],
            [
                "-G",
                "Visual Studio 15 2017",
                "-A",
                "x64",
                "-DCMAKE_POLICY_DEFAULT_CMP0091=NEW",
                "-DCMAKE_MSVC_RUNTIME_LIBRARY=MultiThreadedDebugDLL",
            ]
        );
        assert!(args.contains(&"-DCMAKE_BUILD_TYPE=Debug".to_string()));
        assert!(!args.iter().any(|a| a.contains("POSITION_INDEPENDENT")));
        assert!(args.contains(&"-DBUILD_SHARED=ON".to_string()));
    }

    #[test]
    fn test_static_runtime_forces_static() {
        let features = FeatureSet::new().with("shared", true);
        let plan = translate(&CryptoPP, &windows_msvc("MT", "Release"), &features).unwrap();

        assert!(configure_args(&plan).contains(&"-DBUILD_SHARED=OFF".to_string()));
        assert_eq!(plan.forced.len(), 1);
    }

    #[test]
    fn test_unknown_visual_studio_is_unsupported() {
        let old = profile("windows", "x86", "Release", "visual-studio", "9", Some("MD"), None);
        let err = translate(&CryptoPP, &old, &FeatureSet::new()).unwrap_err();
        assert!(matches!(err, ConfigError::Unsupported { .. }));
    }

    #[test]
    fn test_x86_clang_cxx_flags() {
        let clang = profile("linux", "x86", "Release", "clang", "6.0", None, Some("libstdc++"));
        let plan = translate(&CryptoPP, &clang, &FeatureSet::new()).unwrap();

        assert!(configure_args(&plan).contains(
            &"-DCMAKE_CXX_FLAGS=-m32 -stdlib=libstdc++ -D_GLIBCXX_USE_CXX11_ABI=0".to_string()
        ));
    }

    #[test]
    fn test_ios_cross_build() {
        let plan = translate(&CryptoPP, &ios("armv7"), &FeatureSet::new()).unwrap();

        assert_eq!(
            plan.env.get("CXXFLAGS").map(String::as_str),
            Some("-DNDEBUG -g2 -O3 -fPIC -pipe -fembed-bitcode")
        );
        assert!(matches!(
            &plan.steps[0],
            BuildStep::Patch(p) if p.search == " == " && p.replace == " = "
        ));

        let labels: Vec<_> = plan.run_steps().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["make-armv7", "make-armv7s", "make-arm64", "lipo"]);

        let make = plan.run_step("make-armv7s").unwrap();
        assert_eq!(
            make.command.args[1],
            ". ./setenv-ios.sh armv7s && make clean && make -f GNUmakefile-cross"
        );

        let lipo = plan.run_step("lipo").unwrap();
        assert_eq!(
            lipo.command.render(),
            "lipo -create ./libcryptopp-armv7.a ./libcryptopp-armv7s.a ./libcryptopp-arm64.a -output ./libcryptopp.a"
        );
    }

    #[test]
    fn test_library_names() {
        let vs_static = package_info(&CryptoPP, &windows_msvc("MD", "Release"), &FeatureSet::new())
            .unwrap();
        assert_eq!(vs_static.libs, vec!["cryptopp-static"]);
        assert_eq!(vs_static.lib_files, vec!["cryptopp-static.lib"]);

        let vs_shared = package_info(
            &CryptoPP,
            &windows_msvc("MD", "Release"),
            &FeatureSet::new().with("shared", true),
        )
        .unwrap();
        assert_eq!(vs_shared.libs, vec!["cryptopp"]);

        let linux = package_info(&CryptoPP, &linux_gcc("7"), &FeatureSet::new()).unwrap();
        assert_eq!(linux.libs, vec!["cryptopp"]);
        assert_eq!(linux.lib_files, vec!["libcryptopp.a"]);
    }
}
