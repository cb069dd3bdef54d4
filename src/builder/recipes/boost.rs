//! Boost 1.64.0, built with bootstrap + b2.
//!
//! Components are opt-in. With no component selected the package is
//! header-only and nothing is compiled.

use std::path::PathBuf;

use crate::builder::command::CommandSpec;
use crate::builder::naming::{msvc_abi_suffix, ArtifactNamingScheme, LinkKind};
use crate::builder::plan::{BuildPlan, JobsFlag, RunStep};
use crate::builder::recipe::{CopyRule, PackageInfo, Recipe, SourceSpec};
use crate::builder::toolset::{b2_toolset, bootstrap_toolset, msvc_toolset_tag};
use crate::core::errors::ConfigError;
use crate::core::features::{FeatureSchema, ResolvedFeatures};
use crate::core::settings::{Arch, Compiler, CxxStdlib, Os, TargetProfile};

const VERSION: &str = "1.64.0";
const SOURCE_DIR: &str = "boost_1_64_0";

const IPHONEOS_SDK: &str =
    "/Applications/Xcode.app/Contents/Developer/Platforms/iPhoneOS.platform/Developer/SDKs/iPhoneOS.sdk";

/// Buildable components, in b2 flag order.
const COMPONENTS: &[(&str, &str)] = &[
    ("atomic", "Boost.Atomic"),
    ("chrono", "Boost.Chrono"),
    ("container", "Boost.Container"),
    ("context", "Boost.Context"),
    ("coroutine", "Boost.Coroutine"),
    ("coroutine2", "Boost.Coroutine2"),
    ("date_time", "Boost.DateTime"),
    ("exception", "Boost.Exception"),
    ("filesystem", "Boost.Filesystem"),
    ("graph", "Boost.Graph"),
    ("graph_parallel", "Boost.GraphParallel"),
    ("iostreams", "Boost.Iostreams"),
    ("locale", "Boost.Locale"),
    ("log", "Boost.Log"),
    ("math", "Boost.Math compiled functions"),
    ("mpi", "Boost.MPI"),
    ("program_options", "Boost.ProgramOptions"),
    ("random", "Boost.Random"),
    ("regex", "Boost.Regex"),
    ("serialization", "Boost.Serialization"),
    ("signals", "Boost.Signals"),
    ("system", "Boost.System"),
    ("test", "Boost.Test"),
    ("thread", "Boost.Thread"),
    ("timer", "Boost.Timer"),
    ("type_erasure", "Boost.TypeErasure"),
    ("wave", "Boost.Wave"),
];

/// Libraries a component produces.
fn component_libraries(component: &str) -> &'static [&'static str] {
    match component {
        "atomic" => &["atomic"],
        "chrono" => &["chrono"],
        "container" => &["container"],
        "context" => &["context"],
        "coroutine" => &["coroutine"],
        "coroutine2" => &[],
        "date_time" => &["date_time"],
        "filesystem" => &["filesystem"],
        "graph" => &["graph"],
        "graph_parallel" => &["graph_parallel"],
        "iostreams" => &["iostreams"],
        "locale" => &["locale"],
        "log" => &["log", "log_setup"],
        "math" => &[
            "math_c99",
            "math_c99f",
            "math_c99l",
            "math_tr1",
            "math_tr1f",
            "math_tr1l",
        ],
        "mpi" => &["mpi"],
        "program_options" => &["program_options"],
        "random" => &["random"],
        "regex" => &["regex"],
        "serialization" => &["serialization", "wserialization"],
        "signals" => &["signals"],
        "system" => &["system"],
        "test" => &["unit_test_framework", "prg_exec_monitor"],
        "thread" => &["thread"],
        "timer" => &["timer"],
        "type_erasure" => &["type_erasure"],
        "wave" => &["wave"],
        _ => &[],
    }
}

/// Libraries b2 only ever builds static, whatever `link=` says.
fn static_only_libraries(component: &str) -> &'static [&'static str] {
    match component {
        "exception" => &["exception"],
        "test" => &["test_exec_monitor"],
        _ => &[],
    }
}

pub struct Boost;

impl Boost {
    fn components<'a>(features: &'a ResolvedFeatures) -> impl Iterator<Item = &'static str> + 'a {
        COMPONENTS
            .iter()
            .map(|(name, _)| *name)
            .filter(move |name| features.enabled(name))
    }

    /// Nothing to compile: explicitly requested, or nothing selected.
    fn is_header_only(features: &ResolvedFeatures) -> bool {
        features.enabled("header_only")
            || (Self::components(features).next().is_none() && !features.enabled("python"))
    }

    fn shared(features: &ResolvedFeatures) -> bool {
        !Self::is_header_only(features) && features.enabled("shared")
    }

    fn bootstrap_command(profile: &TargetProfile) -> CommandSpec {
        match profile.os {
            Os::Windows => CommandSpec::new("cmd").args(["/C", "bootstrap.bat"]),
            _ => CommandSpec::new("./bootstrap.sh").arg(format!(
                "--with-toolset={}",
                bootstrap_toolset(&profile.compiler)
            )),
        }
    }

    fn cxxflags(profile: &TargetProfile, features: &ResolvedFeatures) -> Vec<String> {
        let mut flags = Vec::new();

        if !profile.compiler.is_msvc() && features.enabled("fPIC") {
            flags.push("-fPIC".to_string());
        }

        if profile.compiler.is_clang_family() {
            if let Some(libcxx) = profile.compiler.libcxx() {
                flags.push(libcxx.stdlib_flag().to_string());
                flags.push("-std=c++11".to_string());
            }
        }

        if profile.os == Os::Ios {
            for arch in [Arch::Armv7, Arch::Armv7s, Arch::Arm64] {
                flags.push(format!("-arch {}", arch));
            }
            flags.push(format!("-isysroot {}", IPHONEOS_SDK));
        }

        flags
    }

    fn b2_command(profile: &TargetProfile, features: &ResolvedFeatures) -> (CommandSpec, Vec<String>) {
        let program = match profile.os {
            Os::Windows => "b2.exe",
            _ => "./b2",
        };
        let shared = Self::shared(features);

        let mut cmd = CommandSpec::new(program);
        if let Some(toolset) = b2_toolset(&profile.compiler) {
            cmd = cmd.arg(format!("toolset={}", toolset));
        }

        cmd = cmd.arg(format!("link={}", LinkKind::from_shared(shared).as_str()));

        if let Some(runtime) = profile.compiler.runtime() {
            let link = if runtime.is_static() { "static" } else { "shared" };
            cmd = cmd.arg(format!("runtime-link={}", link));
        }

        cmd = cmd
            .arg(format!("variant={}", profile.build_type.as_str().to_lowercase()))
            .arg(format!(
                "address-model={}",
                if profile.arch == Arch::X86 { 32 } else { 64 }
            ));

        let mut feature_flags: Vec<String> = Self::components(features)
            .map(|c| format!("--with-{}", c))
            .collect();
        cmd = cmd.args(feature_flags.iter().cloned());

        if let Some(abi) = profile.compiler.libcxx().and_then(|l| l.glibcxx_abi()) {
            cmd = cmd.arg(format!("define=_GLIBCXX_USE_CXX11_ABI={}", abi));
        }

        if profile.compiler.is_clang_family() && profile.compiler.libcxx() == Some(CxxStdlib::Libcxx) {
            cmd = cmd.arg("linkflags=-stdlib=libc++");
        }

        if profile.os == Os::Ios {
            cmd = cmd.args(["architecture=arm", "target-os=iphone"]);
        }

        let cxxflags = Self::cxxflags(profile, features);
        if !cxxflags.is_empty() {
            cmd = cmd.arg(format!("cxxflags={}", cxxflags.join(" ")));
        }

        cmd = cmd.arg("--abbreviate-paths");

        if features.enabled("python") {
            cmd = cmd.arg("--with-python");
            feature_flags.push("--with-python".to_string());
        }

        (cmd, feature_flags)
    }

    /// Naming for libraries b2 builds static regardless of link mode.
    fn static_naming(&self, profile: &TargetProfile) -> ArtifactNamingScheme {
        let naming = ArtifactNamingScheme::new(profile, LinkKind::Static);
        match msvc_suffix(profile) {
            Some(suffix) => naming.with_prefix("lib").with_suffix(suffix),
            None => naming,
        }
    }
}

fn msvc_suffix(profile: &TargetProfile) -> Option<String> {
    match &profile.compiler {
        Compiler::VisualStudio { version, runtime } => Some(format!(
            "-{}",
            msvc_abi_suffix(
                &msvc_toolset_tag(version),
                *runtime,
                profile.build_type,
                VERSION
            )
        )),
        _ => None,
    }
}

impl Recipe for Boost {
    fn name(&self) -> &'static str {
        "boost"
    }

    fn version(&self) -> &'static str {
        VERSION
    }

    fn description(&self) -> &'static str {
        "Boost C++ libraries"
    }

    fn license(&self) -> &'static str {
        "BSL-1.0"
    }

    fn features(&self, profile: &TargetProfile) -> FeatureSchema {
        let mut schema = FeatureSchema::new("boost")
            .feature("shared", false, "Build shared libraries")
            .feature("header_only", false, "Package headers only, skip the build");

        if !profile.compiler.is_msvc() {
            schema = schema.feature("fPIC", false, "Compile position independent code");
        }

        schema = schema.feature("python", false, "Build Boost.Python");

        for &(name, description) in COMPONENTS {
            schema = schema.feature(name, false, description);
        }

        schema
    }

    fn source(&self, _profile: &TargetProfile) -> SourceSpec {
        let file_name = format!("{}.tar.gz", SOURCE_DIR);
        SourceSpec::Archive {
            urls: vec![format!(
                "http://sourceforge.net/projects/boost/files/boost/{}/{}/download",
                VERSION, file_name
            )],
            file_name,
            sha256: None,
        }
    }

    fn source_dir(&self, _profile: &TargetProfile) -> PathBuf {
        PathBuf::from(SOURCE_DIR)
    }

    fn header_only(&self, features: &ResolvedFeatures) -> bool {
        Self::is_header_only(features)
    }

    fn plan(
        &self,
        profile: &TargetProfile,
        features: &ResolvedFeatures,
    ) -> Result<BuildPlan, ConfigError> {
        let mut plan = BuildPlan::new(self.name(), VERSION, profile.identity(), SOURCE_DIR);

        if Self::is_header_only(features) {
            tracing::debug!("boost: header-only, no build steps");
            return Ok(plan);
        }

        let (b2, feature_flags) = Self::b2_command(profile, features);

        plan.run(
            RunStep::new("bootstrap", SOURCE_DIR, Self::bootstrap_command(profile))
                .with_log("bootstrap.log"),
        )
        .run(RunStep::new("b2", SOURCE_DIR, b2).with_jobs(JobsFlag::Attached("-j")));
        plan.feature_flags = feature_flags;

        Ok(plan)
    }

    fn naming(&self, profile: &TargetProfile, features: &ResolvedFeatures) -> ArtifactNamingScheme {
        let shared = Self::shared(features);
        let naming = ArtifactNamingScheme::new(profile, LinkKind::from_shared(shared));

        match msvc_suffix(profile) {
            Some(suffix) if shared => naming.with_suffix(suffix),
            Some(suffix) => naming.with_prefix("lib").with_suffix(suffix),
            None => naming,
        }
    }

    fn package_rules(&self, _profile: &TargetProfile, features: &ResolvedFeatures) -> Vec<CopyRule> {
        let mut rules = vec![CopyRule::new(
            "*",
            format!("{}/boost", SOURCE_DIR),
            "include/boost",
        )];

        if Self::is_header_only(features) {
            return rules;
        }

        let stage = format!("{}/stage/lib", SOURCE_DIR);
        for pattern in ["*.a", "*.so", "*.so.*", "*.dylib*", "*.lib"] {
            rules.push(CopyRule::new(pattern, &stage, "lib"));
        }
        rules.push(CopyRule::new("*.dll", &stage, "bin"));

        rules
    }

    fn package_info(&self, profile: &TargetProfile, features: &ResolvedFeatures) -> PackageInfo {
        let mut info = PackageInfo::new(self, profile, features);
        let shared = Self::shared(features);

        info.defines.push(
            if shared {
                "BOOST_ALL_DYN_LINK"
            } else {
                "BOOST_USE_STATIC_LIBS"
            }
            .to_string(),
        );

        if Self::is_header_only(features) {
            info.header_only = true;
            info.lib_dirs.clear();
            info.bin_dirs.clear();
            return info;
        }

        let mut bases: Vec<String> = Self::components(features)
            .flat_map(|c| component_libraries(c).iter())
            .map(|lib| format!("boost_{}", lib))
            .collect();

        if features.enabled("python") {
            bases.push("boost_python".to_string());
            if !shared {
                info.defines.push("BOOST_PYTHON_STATIC_LIB".to_string());
            }
        }

        let static_bases: Vec<String> = Self::components(features)
            .flat_map(|c| static_only_libraries(c).iter())
            .map(|lib| format!("boost_{}", lib))
            .collect();

        info = info
            .with_libs(&self.naming(profile, features), bases.iter().map(String::as_str))
            .with_libs(
                &self.static_naming(profile),
                static_bases.iter().map(String::as_str),
            );

        if profile.compiler.is_msvc() {
            info.defines.push("BOOST_ALL_NO_LIB".to_string());
        }

        info
    }
}
