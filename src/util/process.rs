//! Subprocess execution utilities.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output, Stdio};

use anyhow::{Context, Result};

use crate::builder::command::CommandSpec;

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    env: BTreeMap<String, String>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            env: BTreeMap::new(),
            cwd: None,
        }
    }

    /// Start from a structured command, keeping its tokens and env unchanged.
    pub fn from_command(command: &CommandSpec) -> Self {
        ProcessBuilder {
            program: PathBuf::from(&command.program),
            args: command.args.clone(),
            env: command.env.clone(),
            cwd: None,
        }
    }

    /// Replace the program, keeping arguments.
    pub fn program(mut self, program: impl AsRef<Path>) -> Self {
        self.program = program.as_ref().to_path_buf();
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Add variables that are not already set on this builder.
    pub fn env_defaults<'a>(mut self, vars: impl IntoIterator<Item = (&'a String, &'a String)>) -> Self {
        for (key, value) in vars {
            self.env.entry(key.clone()).or_insert_with(|| value.clone());
        }
        self
    }

    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).envs(&self.env);

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Run to completion with stdout and stderr captured.
    pub fn exec(&self) -> Result<Output> {
        self.build_command()
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("failed to execute `{}`", self.display_command()))
    }

    /// Run to completion with inherited stdio.
    pub fn status(&self) -> Result<ExitStatus> {
        self.build_command()
            .stdin(Stdio::null())
            .status()
            .with_context(|| format!("failed to execute `{}`", self.display_command()))
    }

    /// Display the command for logs and error messages.
    pub fn display_command(&self) -> String {
        std::iter::once(self.program.display().to_string())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Locate the program of a command run from `cwd`.
///
/// Programs given with a path (`./b2`) are resolved against `cwd`. Bare
/// names are looked up in `cwd` first, the way `cmd` does, so a freshly
/// bootstrapped `b2.exe` wins over one on PATH; then in PATH.
pub fn resolve_program(program: &str, cwd: &Path) -> Option<PathBuf> {
    let has_separator = program.contains('/') || program.contains('\\');
    let local = cwd.join(program);
    if has_separator {
        local.exists().then_some(local)
    } else if local.is_file() {
        Some(local)
    } else {
        find_executable(program)
    }
}

/// Last `lines` lines of captured output.
pub fn tail(output: &[u8], lines: usize) -> String {
    let text = String::from_utf8_lossy(output);
    let all: Vec<&str> = text.lines().collect();
    all[all.len().saturating_sub(lines)..].join("\n")
}
