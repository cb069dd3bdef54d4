//! OpenSSL 1.0.2h.
//!
//! Unix targets use `config`/`Configure` and make, Windows uses the nmake
//! makefiles generated by the `ms\` scripts, and iOS delegates to the
//! OpenSSL-for-iPhone build script.

use std::path::PathBuf;

use crate::builder::command::CommandSpec;
use crate::builder::naming::{ArtifactNamingScheme, LinkKind};
use crate::builder::plan::{BuildPlan, RunStep};
use crate::builder::recipe::{CopyRule, PackageInfo, Recipe, SourceSpec};
use crate::core::errors::ConfigError;
use crate::core::features::{FeatureSchema, ResolvedFeatures};
use crate::core::settings::{Arch, MsvcRuntime, Os, TargetProfile};

const VERSION: &str = "1.0.2h";
const SOURCE_DIR: &str = "openssl-1.0.2h";
const SHA256: &str = "1d4007e53aad94a5b2002fe045ee7bb0b3d98f1a47f8b2bc851dcd1c74332919";

const IOS_BUILDER_URL: &str = "https://github.com/x2on/OpenSSL-for-iPhone.git";
const IOS_BUILDER_REV: &str = "master";
const IOS_BUILDER_DIR: &str = "OpenSSL-for-iPhone";

const ZLIB: &str = "zlib/1.2.8";
const ELECTRIC_FENCE: &str = "electric-fence/2.2.0";

const FEATURES: &[(&str, &str)] = &[
    ("no_threads", "Build without thread support"),
    ("no_electric_fence", "Do not link against Electric Fence (Linux)"),
    ("no_zlib", "Build without zlib compression"),
    ("zlib_dynamic", "Load zlib at runtime"),
    ("shared", "Build shared libraries"),
    ("no_asm", "Disable assembly code"),
    ("386", "Target plain i386 instructions"),
    ("no_sse2", "Disable SSE2 code paths"),
    ("no_bf", "Disable Blowfish"),
    ("no_cast", "Disable CAST"),
    ("no_des", "Disable DES"),
    ("no_dh", "Disable Diffie-Hellman"),
    ("no_dsa", "Disable DSA"),
    ("no_hmac", "Disable HMAC"),
    ("no_md2", "Disable MD2"),
    ("no_md5", "Disable MD5"),
    ("no_mdc2", "Disable MDC2"),
    ("no_rc2", "Disable RC2"),
    ("no_rc4", "Disable RC4"),
    ("no_rc5", "Disable RC5"),
    ("no_rsa", "Disable RSA"),
    ("no_sha", "Disable SHA"),
];

pub struct OpenSsl;

impl OpenSsl {
    fn subfolder(profile: &TargetProfile) -> &'static str {
        match profile.os {
            Os::Ios => IOS_BUILDER_DIR,
            _ => SOURCE_DIR,
        }
    }

    /// Configure tokens for enabled toggles.
    fn configure_tokens(features: &ResolvedFeatures) -> Vec<String> {
        features
            .enabled_names()
            .filter(|name| *name != "no_electric_fence")
            .map(|name| name.replace('_', "-"))
            .collect()
    }

    fn unsupported_windows(&self, profile: &TargetProfile) -> ConfigError {
        ConfigError::Unsupported {
            recipe: self.name().to_string(),
            what: format!("Windows with {}", profile.compiler.name()),
        }
    }

    fn uses_electric_fence(profile: &TargetProfile, features: &ResolvedFeatures) -> bool {
        profile.os == Os::Linux && !features.enabled("no_electric_fence")
    }

    fn linux_plan(plan: &mut BuildPlan, profile: &TargetProfile, features: &ResolvedFeatures) {
        let configure_file = format!("{}/Configure", SOURCE_DIR);
        let efence = Self::uses_electric_fence(profile, features);
        if !efence {
            plan.patch(&configure_file, "::-lefence::", "::")
                .patch(&configure_file, "::-lefence ", "::");
        }

        let x86 = profile.arch == Arch::X86;
        let config = if x86 {
            CommandSpec::new("setarch").args(["i386", "./config"])
        } else {
            CommandSpec::new("./config")
        };

        let config = config
            .arg("-fPIC")
            .arg_if(profile.is_debug(), "-d")
            .args(plan.feature_flags.iter().cloned())
            .arg_if(efence, "-lefence")
            .arg_if(x86, "-m32");

        plan.run(RunStep::new("configure", SOURCE_DIR, config))
            .run(RunStep::new(
                "make depend",
                SOURCE_DIR,
                CommandSpec::new("make").arg("depend"),
            ))
            .run(RunStep::new("make", SOURCE_DIR, CommandSpec::new("make")));
    }

    fn macos_plan(plan: &mut BuildPlan, profile: &TargetProfile) {
        let configure = match profile.arch {
            Arch::X86_64 => CommandSpec::new("./Configure").arg("darwin64-x86_64-cc"),
            _ => CommandSpec::new("./config"),
        }
        .args(plan.feature_flags.iter().cloned())
        .arg_if(profile.arch == Arch::X86, "-m32");

        plan.run(RunStep::new("configure", SOURCE_DIR, configure))
            .patch(
                format!("{}/Makefile.shared", SOURCE_DIR),
                r#"SHAREDFLAGS="$$SHAREDFLAGS -install_name $(INSTALLTOP)/$(LIBDIR)/$$SHLIB$"#,
                r#"SHAREDFLAGS="$$SHAREDFLAGS -install_name $$SHLIB$"#,
            )
            .run(RunStep::new("make", SOURCE_DIR, CommandSpec::new("make")));
    }

    fn windows_plan(
        plan: &mut BuildPlan,
        profile: &TargetProfile,
        features: &ResolvedFeatures,
        runtime: MsvcRuntime,
    ) {
        let target = format!(
            "{}VC-WIN{}",
            if profile.is_debug() { "debug-" } else { "" },
            if profile.arch == Arch::X86 { "32" } else { "64A" }
        );

        let configure = CommandSpec::new("perl")
            .args(["Configure", target.as_str(), "no-asm", "--prefix=../binaries"])
            .args(plan.feature_flags.iter().cloned())
            .arg("-UOPENSSL_USE_APPLINK");
        plan.run(RunStep::new("configure", SOURCE_DIR, configure));

        if features.enabled("no_asm") {
            plan.run(RunStep::new("do_nasm", SOURCE_DIR, ms_script("do_nasm")));
        }

        let script = if profile.arch == Arch::X86 {
            "do_ms"
        } else {
            "do_win64a"
        };
        plan.run(RunStep::new(script, SOURCE_DIR, ms_script(script)));

        let ntdll = format!("{}/ms/ntdll.mak", SOURCE_DIR);
        let nt = format!("{}/ms/nt.mak", SOURCE_DIR);
        let flag = format!("{} ", runtime.as_flag());
        plan.patch(&ntdll, "/MD ", &flag)
            .patch(&nt, "/MT ", &flag)
            .patch(&ntdll, "/MDd ", &flag)
            .patch(&nt, "/MTd ", &flag)
            .patch(&ntdll, "-DOPENSSL_USE_APPLINK", "")
            .patch(&nt, "-DOPENSSL_USE_APPLINK", "");

        let makefile = if features.enabled("shared") {
            r"ms\ntdll.mak"
        } else {
            r"ms\nt.mak"
        };
        let nmake = CommandSpec::new("nmake").args(["-f", makefile]);
        plan.run(RunStep::new("nmake", SOURCE_DIR, nmake.clone()))
            .run(RunStep::new("nmake install", SOURCE_DIR, nmake.arg("install")));

        for lib in ["libeay32", "ssleay32"] {
            plan.rename(
                format!("binaries/lib/{}.lib", lib),
                format!("binaries/lib/{}{}.lib", lib, runtime),
                true,
            );
        }
    }
}

fn ms_script(name: &str) -> CommandSpec {
    CommandSpec::new("cmd").args(["/C".to_string(), format!(r"ms\{}", name)])
}

impl Recipe for OpenSsl {
    fn name(&self) -> &'static str {
        "openssl"
    }

    fn version(&self) -> &'static str {
        VERSION
    }

    fn description(&self) -> &'static str {
        "OpenSSL TLS/SSL and crypto library"
    }

    fn license(&self) -> &'static str {
        "OpenSSL"
    }

    fn features(&self, _profile: &TargetProfile) -> FeatureSchema {
        FEATURES
            .iter()
            .fold(FeatureSchema::new("openssl"), |schema, &(name, description)| {
                schema.feature(name, false, description)
            })
    }

    fn source(&self, profile: &TargetProfile) -> SourceSpec {
        match profile.os {
            Os::Ios => SourceSpec::Git {
                url: IOS_BUILDER_URL.to_string(),
                rev: IOS_BUILDER_REV.to_string(),
                dest: PathBuf::from(IOS_BUILDER_DIR),
            },
            _ => SourceSpec::Archive {
                urls: vec![
                    format!("https://www.openssl.org/source/old/1.0.2/openssl-{}.tar.gz", VERSION),
                    format!("https://www.openssl.org/source/openssl-{}.tar.gz", VERSION),
                ],
                file_name: format!("openssl-{}.tar.gz", VERSION),
                sha256: Some(SHA256.to_string()),
            },
        }
    }

    fn source_dir(&self, profile: &TargetProfile) -> PathBuf {
        PathBuf::from(Self::subfolder(profile))
    }

    fn check_profile(&self, profile: &TargetProfile) -> Result<(), ConfigError> {
        if profile.os == Os::Windows && !profile.compiler.is_msvc() {
            return Err(self.unsupported_windows(profile));
        }
        Ok(())
    }

    fn plan(
        &self,
        profile: &TargetProfile,
        features: &ResolvedFeatures,
    ) -> Result<BuildPlan, ConfigError> {
        let mut plan = BuildPlan::new(
            self.name(),
            VERSION,
            profile.identity(),
            Self::subfolder(profile),
        );

        if profile.os != Os::Ios {
            plan.feature_flags = Self::configure_tokens(features);
        }

        match profile.os {
            Os::Linux => Self::linux_plan(&mut plan, profile, features),
            Os::Macos => Self::macos_plan(&mut plan, profile),
            Os::Windows => {
                let runtime = profile
                    .compiler
                    .runtime()
                    .ok_or_else(|| self.unsupported_windows(profile))?;
                Self::windows_plan(&mut plan, profile, features, runtime);
            }
            Os::Ios => {
                plan.run(RunStep::new(
                    "build-libssl",
                    IOS_BUILDER_DIR,
                    CommandSpec::new("./build-libssl.sh").arg(format!("--version={}", VERSION)),
                ));
            }
        }

        Ok(plan)
    }

    fn naming(&self, profile: &TargetProfile, features: &ResolvedFeatures) -> ArtifactNamingScheme {
        ArtifactNamingScheme::new(profile, LinkKind::from_shared(features.enabled("shared")))
    }

    fn package_rules(&self, profile: &TargetProfile, features: &ResolvedFeatures) -> Vec<CopyRule> {
        let subfolder = Self::subfolder(profile);
        let mut rules = vec![CopyRule::new("*applink.c", subfolder, "include/openssl").flatten()];

        if profile.os == Os::Windows {
            rules.push(CopyRule::new("*.lib", "binaries/lib", "lib").flatten());
            rules.push(CopyRule::new("*.dll", "binaries/bin", "bin").flatten());
            rules.push(CopyRule::new("*.h", "binaries/include", "include/openssl").flatten());
            return rules;
        }

        if features.enabled("shared") {
            for pattern in [
                "*libcrypto*.dylib",
                "*libssl*.dylib",
                "*libcrypto.so*",
                "*libssl.so*",
            ] {
                rules.push(CopyRule::new(pattern, subfolder, "lib").flatten());
            }
        } else {
            rules.push(CopyRule::new("*.a", subfolder, "lib").flatten());
        }

        rules.push(
            CopyRule::new("*", format!("{}/include", subfolder), "include/openssl").flatten(),
        );

        rules
    }

    fn package_info(&self, profile: &TargetProfile, features: &ResolvedFeatures) -> PackageInfo {
        let mut info = PackageInfo::new(self, profile, features);

        match profile.compiler.runtime() {
            Some(runtime) => {
                let import_libs = ArtifactNamingScheme::new(profile, LinkKind::Static)
                    .with_suffix(runtime.as_str());
                info = info.with_libs(&import_libs, ["ssleay32", "libeay32"]);
                info.libs.extend(["crypt32".to_string(), "msi".to_string()]);
            }
            None => {
                info = info.with_libs(&self.naming(profile, features), ["ssl", "crypto"]);
                if profile.os == Os::Linux {
                    info.libs.push("dl".to_string());
                }
            }
        }

        if profile.os != Os::Ios {
            if !features.enabled("no_zlib") {
                info.requires.push(ZLIB.to_string());
            }
            if Self::uses_electric_fence(profile, features) {
                info.requires.push(ELECTRIC_FENCE.to_string());
            }
        }

        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::plan::BuildStep;
    use crate::builder::recipe::{package_info, translate};
    use crate::core::features::FeatureSet;
    use crate::test_support::{ios, linux_gcc, macos_apple_clang, profile, windows_msvc};

    fn patches(plan: &BuildPlan) -> Vec<(String, String)> {
        plan.steps
            .iter()
            .filter_map(|s| match s {
                BuildStep::Patch(p) => Some((p.search.clone(), p.replace.clone())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_linux_default_links_electric_fence() {
        let plan = translate(&OpenSsl, &linux_gcc("7.2.0"), &FeatureSet::new()).unwrap();

        assert!(patches(&plan).is_empty());
        assert_eq!(
            plan.run_step("configure").unwrap().command.tokens(),
            vec!["./config", "-fPIC", "-lefence"]
        );
        let labels: Vec<_> = plan.run_steps().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["configure", "make depend", "make"]);
    }

    #[test]
    fn test_linux_x86_debug_tokens() {
        let profile = profile("linux", "x86", "Debug", "gcc", "5.4", None, None);
        let features = FeatureSet::new()
            .with("no_electric_fence", true)
            .with("no_asm", true)
            .with("shared", true);
        let plan = translate(&OpenSsl, &profile, &features).unwrap();

        assert_eq!(plan.feature_flags, vec!["shared", "no-asm"]);
        assert_eq!(
            plan.run_step("configure").unwrap().command.tokens(),
            vec!["setarch", "i386", "./config", "-fPIC", "-d", "shared", "no-asm", "-m32"]
        );
        assert_eq!(
            patches(&plan),
            vec![
                ("::-lefence::".to_string(), "::".to_string()),
                ("::-lefence ".to_string(), "::".to_string()),
            ]
        );
    }

    #[test]
    fn test_macos_configure_then_patch() {
        let features = FeatureSet::new().with("no_zlib", true).with("386", true);
        let plan = translate(&OpenSsl, &macos_apple_clang(), &features).unwrap();

        assert!(matches!(&plan.steps[0], BuildStep::Run(r) if r.command.tokens()
            == vec!["./Configure", "darwin64-x86_64-cc", "no-zlib", "386"]));
        assert!(matches!(&plan.steps[1], BuildStep::Patch(p) if p.file.ends_with("Makefile.shared")));
        assert!(matches!(&plan.steps[2], BuildStep::Run(r) if r.label == "make"));
    }

    #[test]
    fn test_windows_requires_visual_studio() {
        let mingw = profile("windows", "x86_64", "Release", "gcc", "7", None, None);
        let err = translate(&OpenSsl, &mingw, &FeatureSet::new()).unwrap_err();
        assert!(matches!(err, ConfigError::Unsupported { ref recipe, .. } if recipe == "openssl"));
    }

    #[test]
    fn test_windows_debug_static_runtime() {
        let features = FeatureSet::new().with("no_asm", true).with("no_zlib", true);
        let plan = translate(&OpenSsl, &windows_msvc("MTd", "Debug"), &features).unwrap();

        assert_eq!(
            plan.run_step("configure").unwrap().command.tokens(),
            vec![
                "perl",
                "Configure",
                "debug-VC-WIN64A",
                "no-asm",
                "--prefix=../binaries",
                "no-zlib",
                "no-asm",
                "-UOPENSSL_USE_APPLINK"
            ]
        );
        assert!(plan.run_step("do_nasm").is_some());
        assert_eq!(
            plan.run_step("do_win64a").unwrap().command.tokens(),
            vec!["cmd", "/C", r"ms\do_win64a"]
        );
        assert_eq!(
            plan.run_step("nmake install").unwrap().command.tokens(),
            vec!["nmake", "-f", r"ms\nt.mak", "install"]
        );

        let patches = patches(&plan);
        assert_eq!(patches.len(), 6);
        assert_eq!(patches[0], ("/MD ".to_string(), "/MTd ".to_string()));

        let renames: Vec<_> = plan
            .steps
            .iter()
            .filter_map(|s| match s {
                BuildStep::Rename(r) => Some(r.to.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            renames,
            vec![
                PathBuf::from("binaries/lib/libeay32MTd.lib"),
                PathBuf::from("binaries/lib/ssleay32MTd.lib")
            ]
        );
    }

    #[test]
    fn test_windows_x86_uses_do_ms() {
        let vs = profile("windows", "x86", "Release", "visual-studio", "14", Some("MD"), None);
        let plan = translate(&OpenSsl, &vs, &FeatureSet::new().with("shared", true)).unwrap();

        assert_eq!(plan.run_step("configure").unwrap().command.args[1], "VC-WIN32");
        assert!(plan.run_step("do_ms").is_some());
        assert!(plan.run_step("do_nasm").is_none());
        assert_eq!(
            plan.run_step("nmake").unwrap().command.args,
            vec!["-f", r"ms\ntdll.mak"]
        );
    }

    #[test]
    fn test_ios_uses_builder_script() {
        let profile = ios("arm64");
        let plan = translate(&OpenSsl, &profile, &FeatureSet::new().with("shared", true)).unwrap();

        assert_eq!(plan.steps.len(), 1);
        assert_eq!(
            plan.run_step("build-libssl").unwrap().command.render(),
            "./build-libssl.sh --version=1.0.2h"
        );
        assert_eq!(plan.forced.len(), 1);
        assert!(matches!(OpenSsl.source(&profile), SourceSpec::Git { .. }));
    }

    #[test]
    fn test_library_names_and_requirements() {
        let windows = package_info(&OpenSsl, &windows_msvc("MD", "Release"), &FeatureSet::new())
            .unwrap();
        assert_eq!(windows.libs, vec!["ssleay32MD", "libeay32MD", "crypt32", "msi"]);
        assert_eq!(windows.lib_files, vec!["ssleay32MD.lib", "libeay32MD.lib"]);
        assert_eq!(windows.requires, vec!["zlib/1.2.8"]);

        let linux = package_info(&OpenSsl, &linux_gcc("7"), &FeatureSet::new()).unwrap();
        assert_eq!(linux.libs, vec!["ssl", "crypto", "dl"]);
        assert_eq!(linux.requires, vec!["zlib/1.2.8", "electric-fence/2.2.0"]);

        let mac = package_info(
            &OpenSsl,
            &macos_apple_clang(),
            &FeatureSet::new().with("no_zlib", true).with("shared", true),
        )
        .unwrap();
        assert_eq!(mac.libs, vec!["ssl", "crypto"]);
        assert_eq!(mac.lib_files, vec!["libssl.dylib", "libcrypto.dylib"]);
        assert!(mac.requires.is_empty());
    }

    #[test]
    fn test_archive_source_with_fallback() {
        match OpenSsl.source(&linux_gcc("7")) {
            SourceSpec::Archive { urls, sha256, .. } => {
                assert_eq!(urls.len(), 2);
                assert!(urls[0].contains("/old/1.0.2/"));
                assert_eq!(sha256.as_deref(), Some(SHA256));
            }
            other => panic!("unexpected source: {:?}", other),
        }
    }
}
