//! Global context for dockyard operations.
//!
//! Holds the working directory, the dockyard home and the merged
//! configuration, and derives every path a build needs from them.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::config::{self, Config};

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global data (~/.dockyard/)
    home: PathBuf,

    /// Merged global and project configuration
    config: Config,

    verbose: bool,
}

impl GlobalContext {
    /// Create a context for the current directory, loading configuration.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a context rooted at `cwd`, loading configuration.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        let home = config::global_config_dir().unwrap_or_else(|| cwd.join(".dockyard"));
        let config = config::load_config(
            Some(&home.join("config.toml")),
            &config::project_config_path(&cwd),
        );

        GlobalContext {
            cwd,
            home,
            config,
            verbose: false,
        }
    }

    /// Use a different home directory, reloading configuration from it.
    pub fn with_home(mut self, home: PathBuf) -> Self {
        self.config = config::load_config(
            Some(&home.join("config.toml")),
            &config::project_config_path(&self.cwd),
        );
        self.home = home;
        self
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the dockyard home directory (~/.dockyard/).
    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Download cache shared by all builds (~/.dockyard/cache/downloads).
    pub fn download_cache_dir(&self) -> PathBuf {
        self.home.join("cache").join("downloads")
    }

    /// Root of per-build work directories.
    pub fn work_root(&self) -> PathBuf {
        match self.config.build.work_dir {
            Some(ref dir) => self.cwd.join(dir),
            None => self.home.join("work"),
        }
    }

    /// Default root for finished packages.
    pub fn output_root(&self) -> PathBuf {
        match self.config.build.output_dir {
            Some(ref dir) => self.cwd.join(dir),
            None => self.cwd.join("dockyard-packages"),
        }
    }

    /// Global config file (~/.dockyard/config.toml).
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}
