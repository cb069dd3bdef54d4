//! CLI integration tests for dockyard.
//!
//! None of these touch the network: `plan`, `info` and `options` only
//! translate, and the build test runs in offline mode.

use std::fs;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the dockyard binary command, isolated from the user's config.
fn dockyard(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("dockyard").unwrap();
    cmd.env("HOME", home.path())
        .env("USERPROFILE", home.path())
        .current_dir(home.path());
    cmd
}

fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

const LINUX_GCC: [&str; 8] = [
    "--os",
    "Linux",
    "--arch",
    "x86_64",
    "--compiler",
    "gcc",
    "--compiler-version",
    "7.2.0",
];

// ============================================================================
// dockyard list / options
// ============================================================================

#[test]
fn test_list_shows_all_recipes() {
    let tmp = temp_dir();

    dockyard(&tmp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("boost"))
        .stdout(predicate::str::contains("1.64.0"))
        .stdout(predicate::str::contains("cryptopp"))
        .stdout(predicate::str::contains("openssl"))
        .stdout(predicate::str::contains("1.0.2h"));
}

#[test]
fn test_options_lists_boost_components() {
    let tmp = temp_dir();

    dockyard(&tmp)
        .args(["options", "boost"])
        .args(LINUX_GCC)
        .assert()
        .success()
        .stdout(predicate::str::contains("filesystem"))
        .stdout(predicate::str::contains("header_only"))
        .stdout(predicate::str::contains("shared"));
}

#[test]
fn test_unknown_recipe_fails() {
    let tmp = temp_dir();

    dockyard(&tmp)
        .args(["options", "zlib"])
        .args(LINUX_GCC)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no recipe named `zlib`"))
        .stderr(predicate::str::contains("available recipes: boost, cryptopp, openssl"));
}

// ============================================================================
// dockyard plan
// ============================================================================

#[test]
fn test_plan_boost_shell() {
    let tmp = temp_dir();

    dockyard(&tmp)
        .args(["plan", "boost", "-o", "filesystem=true", "-o", "system=true", "-j", "4"])
        .args(LINUX_GCC)
        .assert()
        .success()
        .stdout(predicate::str::contains("./bootstrap.sh --with-toolset=gcc"))
        .stdout(predicate::str::contains("toolset=gcc-7"))
        .stdout(predicate::str::contains("--with-filesystem"))
        .stdout(predicate::str::contains("--with-system"))
        .stdout(predicate::str::contains("-j4"));
}

#[test]
fn test_plan_boost_json() {
    let tmp = temp_dir();

    let output = dockyard(&tmp)
        .args(["plan", "boost", "--format", "json", "-o", "thread=true"])
        .args(LINUX_GCC)
        .output()
        .unwrap();
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(plan["recipe"], "boost");
    assert_eq!(plan["version"], "1.64.0");
    assert_eq!(plan["source_dir"], "boost_1_64_0");

    let flags = plan["feature_flags"].as_array().unwrap();
    assert!(flags.iter().any(|f| f == "--with-thread"));
    assert!(plan["steps"]
        .as_array()
        .unwrap()
        .iter()
        .all(|s| s["type"].is_string()));
}

#[test]
fn test_plan_boost_without_components_is_header_only() {
    let tmp = temp_dir();

    dockyard(&tmp)
        .args(["plan", "boost"])
        .args(LINUX_GCC)
        .assert()
        .success()
        .stdout(predicate::str::contains("header-only"))
        .stdout(predicate::str::contains("b2").not());
}

#[test]
fn test_plan_unknown_feature_fails() {
    let tmp = temp_dir();

    dockyard(&tmp)
        .args(["plan", "boost", "-o", "bogus=true"])
        .args(LINUX_GCC)
        .assert()
        .failure()
        .stderr(predicate::str::contains("`bogus` is not a feature of `boost`"))
        .stderr(predicate::str::contains("dockyard options boost"));
}

#[test]
fn test_plan_malformed_assignment_fails() {
    let tmp = temp_dir();

    dockyard(&tmp)
        .args(["plan", "boost", "-o", "shared"])
        .args(LINUX_GCC)
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot parse feature assignment"));
}

#[test]
fn test_plan_missing_compiler_fails() {
    let tmp = temp_dir();

    dockyard(&tmp)
        .args(["plan", "cryptopp", "--os", "Linux", "--arch", "x86_64"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("setting `compiler` is required"));
}

#[test]
fn test_plan_static_runtime_forces_static_link() {
    let tmp = temp_dir();

    dockyard(&tmp)
        .args(["plan", "boost", "-o", "shared=true", "-o", "system=true"])
        .args([
            "--os",
            "Windows",
            "--arch",
            "x86_64",
            "--compiler",
            "visual-studio",
            "--compiler-version",
            "15",
            "--runtime",
            "MT",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("link=static"))
        .stdout(predicate::str::contains("runtime-link=static"))
        .stderr(predicate::str::contains("forcing shared=false"));
}

#[test]
fn test_plan_from_profile_file() {
    let tmp = temp_dir();
    let profile = tmp.path().join("ios.toml");
    fs::write(
        &profile,
        r#"
os = "iOS"
arch = "arm64"
build_type = "Release"

[compiler]
name = "apple-clang"
version = "9.0"
libcxx = "libc++"
"#,
    )
    .unwrap();

    dockyard(&tmp)
        .args(["plan", "openssl", "--profile"])
        .arg(&profile)
        .assert()
        .success()
        .stdout(predicate::str::contains("./build-libssl.sh --version=1.0.2h"));
}

#[test]
fn test_plan_inconsistent_profile_fails() {
    let tmp = temp_dir();

    dockyard(&tmp)
        .args(["plan", "cryptopp", "--os", "Linux", "--arch", "x86_64"])
        .args(["--compiler", "visual-studio", "--compiler-version", "15", "--runtime", "MD"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("inconsistent profile"));
}

#[test]
fn test_openssl_windows_gcc_unsupported() {
    let tmp = temp_dir();

    dockyard(&tmp)
        .args(["plan", "openssl", "--os", "Windows", "--arch", "x86_64"])
        .args(["--compiler", "gcc", "--compiler-version", "7.2.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("`openssl` cannot be built for Windows with gcc"));
}

// ============================================================================
// dockyard info
// ============================================================================

#[test]
fn test_info_debug_static_runtime_naming() {
    let tmp = temp_dir();

    dockyard(&tmp)
        .args(["info", "boost", "-o", "system=true"])
        .args([
            "--os",
            "Windows",
            "--arch",
            "x86_64",
            "--compiler",
            "visual-studio",
            "--compiler-version",
            "15",
            "--runtime",
            "MTd",
            "--build-type",
            "Debug",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("libboost_system-vc141-mt-sgd-1_64.lib"))
        .stdout(predicate::str::contains("BOOST_USE_STATIC_LIBS"));
}

#[test]
fn test_info_json_openssl_linux() {
    let tmp = temp_dir();

    let output = dockyard(&tmp)
        .args(["info", "openssl", "--json"])
        .args(LINUX_GCC)
        .output()
        .unwrap();
    assert!(output.status.success());

    let info: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(info["name"], "openssl");
    let libs: Vec<&str> = info["libs"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v.as_str())
        .collect();
    assert_eq!(libs, vec!["ssl", "crypto", "dl"]);
}

// ============================================================================
// dockyard build
// ============================================================================

#[test]
fn test_build_offline_without_cache_fails() {
    let tmp = temp_dir();
    fs::create_dir_all(tmp.path().join(".dockyard")).unwrap();
    fs::write(
        tmp.path().join(".dockyard/config.toml"),
        "[net]\noffline = true\n",
    )
    .unwrap();

    dockyard(&tmp)
        .args(["build", "cryptopp"])
        .args(LINUX_GCC)
        .assert()
        .failure()
        .stderr(predicate::str::contains("offline mode is enabled"));
}

// ============================================================================
// dockyard completions
// ============================================================================

#[test]
fn test_completions_bash() {
    let tmp = temp_dir();

    dockyard(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dockyard"));
}
