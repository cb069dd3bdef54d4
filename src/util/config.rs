//! Configuration file support.
//!
//! Two locations are read:
//! - Global: `~/.dockyard/config.toml` - user-wide defaults
//! - Project: `.dockyard/config.toml` - overrides for the current directory
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Dockyard configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings
    pub build: BuildConfig,

    /// Network settings
    pub net: NetConfig,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Default number of parallel jobs (None = auto-detect)
    pub jobs: Option<usize>,

    /// Where sources are unpacked and built
    pub work_dir: Option<PathBuf>,

    /// Where finished packages are written
    pub output_dir: Option<PathBuf>,

    /// Keep the work directory after a successful build
    pub keep_work: Option<bool>,
}

/// Network-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetConfig {
    /// Never download; use the cache only
    pub offline: Option<bool>,

    /// HTTP timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file is missing or broken.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.build.jobs.is_some() {
            self.build.jobs = other.build.jobs;
        }
        if other.build.work_dir.is_some() {
            self.build.work_dir = other.build.work_dir;
        }
        if other.build.output_dir.is_some() {
            self.build.output_dir = other.build.output_dir;
        }
        if other.build.keep_work.is_some() {
            self.build.keep_work = other.build.keep_work;
        }

        if other.net.offline.is_some() {
            self.net.offline = other.net.offline;
        }
        if other.net.timeout_secs.is_some() {
            self.net.timeout_secs = other.net.timeout_secs;
        }
    }

    pub fn keep_work(&self) -> bool {
        self.build.keep_work.unwrap_or(false)
    }

    pub fn offline(&self) -> bool {
        self.net.offline.unwrap_or(false)
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.dockyard/config.toml)
/// 2. Global config (~/.dockyard/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }
    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global dockyard directory (~/.dockyard).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".dockyard"))
}

/// Get the project config path (.dockyard/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".dockyard").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.build.jobs.is_none());
        assert!(!config.keep_work());
        assert!(!config.offline());
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[build]
jobs = 8
output_dir = "packages"

[net]
timeout_secs = 30
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.build.jobs, Some(8));
        assert_eq!(config.build.output_dir, Some(PathBuf::from("packages")));
        assert_eq!(config.net.timeout_secs, Some(30));
        assert!(config.build.work_dir.is_none());
    }

    #[test]
    fn test_config_load_rejects_bad_types() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[build]\njobs = \"many\"\n").unwrap();

        assert!(Config::load(&path).is_err());
        assert!(Config::load_or_default(&path).build.jobs.is_none());
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        base.build.jobs = Some(4);
        base.build.work_dir = Some(PathBuf::from("/tmp/work"));

        let mut other = Config::default();
        other.build.jobs = Some(16);
        other.net.offline = Some(true);

        base.merge(other);
        assert_eq!(base.build.jobs, Some(16));
        assert_eq!(base.build.work_dir, Some(PathBuf::from("/tmp/work")));
        assert!(base.offline());
    }

    #[test]
    fn test_load_config_project_wins() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        let project = project_config_path(tmp.path());
        std::fs::write(&global, "[build]\njobs = 2\nkeep_work = true\n").unwrap();
        std::fs::create_dir_all(project.parent().unwrap()).unwrap();
        std::fs::write(&project, "[build]\njobs = 12\n").unwrap();

        let config = load_config(Some(&global), &project);
        assert_eq!(config.build.jobs, Some(12));
        assert!(config.keep_work());
    }

    #[test]
    fn test_load_config_project_disables_global_flags() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        let project = project_config_path(tmp.path());
        std::fs::write(&global, "[build]\nkeep_work = true\n\n[net]\noffline = true\n").unwrap();
        std::fs::create_dir_all(project.parent().unwrap()).unwrap();
        std::fs::write(&project, "[build]\nkeep_work = false\n\n[net]\noffline = false\n").unwrap();

        let config = load_config(Some(&global), &project);
        assert!(!config.keep_work());
        assert!(!config.offline());

        // Unset in the project keeps the global value.
        std::fs::write(&project, "[build]\njobs = 3\n").unwrap();
        let config = load_config(Some(&global), &project);
        assert!(config.keep_work());
        assert!(config.offline());
    }

    #[test]
    fn test_load_config_missing_files() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(None, &tmp.path().join("nope.toml"));
        assert!(config.build.jobs.is_none());
    }
}
