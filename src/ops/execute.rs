//! Plan execution.
//!
//! Runs the steps of a translated plan in order against an unpacked work
//! tree. The first failing step stops the build.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;

use crate::builder::plan::{BuildPlan, BuildStep, PatchStep, RenameStep, RunStep};
use crate::util::diagnostic::{suggestions, Diagnostic};
use crate::util::fs::{move_file, replace_in_file};
use crate::util::process::{self, ProcessBuilder};

/// Lines of stderr kept for error reports.
const STDERR_TAIL_LINES: usize = 20;

/// Lines of a tool's log file shown on failure.
const LOG_TAIL_LINES: usize = 40;

/// Errors from running a plan's steps.
#[derive(Debug, Error)]
pub enum BuildToolError {
    #[error("`{program}` not found (needed by step `{step}`)")]
    ToolNotFound { step: String, program: String },

    #[error("step `{step}` failed: `{command}` exited with {status}")]
    Failed {
        step: String,
        command: String,
        status: String,
        stderr_tail: String,
        /// Log the tool wrote, with its tail
        log: Option<(PathBuf, String)>,
    },

    #[error("failed to patch {}: {message}", file.display())]
    PatchFailed { file: PathBuf, message: String },

    #[error("failed to rename {} to {}: {message}", from.display(), to.display())]
    RenameFailed {
        from: PathBuf,
        to: PathBuf,
        message: String,
    },
}

impl BuildToolError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            BuildToolError::ToolNotFound { step, program } => {
                Diagnostic::error(format!("`{}` was not found", program))
                    .with_context(format!("needed by step: {}", step))
                    .with_suggestion(suggestions::TOOL_NOT_FOUND)
            }

            BuildToolError::Failed {
                step,
                command,
                status,
                stderr_tail,
                log,
            } => {
                let mut diag = Diagnostic::error(format!("step `{}` exited with {}", step, status))
                    .with_context(format!("command: {}", command));

                if !stderr_tail.is_empty() {
                    diag = diag.with_context(format!("stderr:\n{}", stderr_tail));
                }
                if let Some((path, tail)) = log {
                    diag = diag
                        .with_location(path)
                        .with_context(format!("log tail:\n{}", tail));
                }

                diag.with_suggestion(suggestions::BUILD_FAILED)
            }

            BuildToolError::PatchFailed { file, message } => {
                Diagnostic::error(format!("could not patch {}", file.display()))
                    .with_context(message.clone())
            }

            BuildToolError::RenameFailed { from, to, message } => Diagnostic::error(format!(
                "could not rename {} to {}",
                from.display(),
                to.display()
            ))
            .with_context(message.clone()),
        }
    }
}

/// Options for running a plan.
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Parallel job count passed to tools that accept one
    pub jobs: usize,
    /// Stream tool output instead of capturing it behind a spinner
    pub verbose: bool,
}

/// Run every step of `plan` against `work_root`.
pub fn execute_plan(plan: &BuildPlan, work_root: &Path, opts: &ExecuteOptions) -> Result<()> {
    if plan.is_header_only() {
        tracing::info!("{} {} is header-only, nothing to build", plan.recipe, plan.version);
        return Ok(());
    }

    let start = Instant::now();
    let total = plan.steps.len();

    for (i, step) in plan.steps.iter().enumerate() {
        match step {
            BuildStep::Run(run) => {
                tracing::info!("[{}/{}] {}", i + 1, total, run.label);
                run_step(plan, run, work_root, opts)?;
            }
            BuildStep::Patch(patch) => apply_patch(patch, work_root)?,
            BuildStep::Rename(rename) => apply_rename(rename, work_root)?,
        }
    }

    tracing::info!(
        "Built {} {} in {:.1}s",
        plan.recipe,
        plan.version,
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn run_step(
    plan: &BuildPlan,
    step: &RunStep,
    work_root: &Path,
    opts: &ExecuteOptions,
) -> Result<(), BuildToolError> {
    let cwd = work_root.join(&step.cwd);
    let command = step.command_with_jobs(opts.jobs);

    let program = process::resolve_program(&command.program, &cwd).ok_or_else(|| {
        BuildToolError::ToolNotFound {
            step: step.label.clone(),
            program: command.program.clone(),
        }
    })?;

    let pb = ProcessBuilder::from_command(&command)
        .program(program)
        .env_defaults(&plan.env)
        .cwd(&cwd);

    tracing::debug!("running `{}` in {}", command.render(), cwd.display());

    let failed = |status: String, stderr_tail: String| BuildToolError::Failed {
        step: step.label.clone(),
        command: command.render(),
        status,
        stderr_tail,
        log: step
            .log_file
            .as_ref()
            .map(|log| cwd.join(log))
            .filter(|log| log.is_file())
            .map(|log| {
                let tail = std::fs::read(&log)
                    .map(|bytes| process::tail(&bytes, LOG_TAIL_LINES))
                    .unwrap_or_default();
                (log, tail)
            }),
    };

    if opts.verbose {
        let status = pb
            .status()
            .map_err(|e| failed(format!("{:#}", e), String::new()))?;
        if !status.success() {
            return Err(failed(status.to_string(), String::new()));
        }
        return Ok(());
    }

    let spinner = spinner(&step.label);
    let output = pb.exec();
    spinner.finish_and_clear();

    let output = output.map_err(|e| failed(format!("{:#}", e), String::new()))?;
    if !output.status.success() {
        return Err(failed(
            output.status.to_string(),
            process::tail(&output.stderr, STDERR_TAIL_LINES),
        ));
    }

    Ok(())
}

fn spinner(label: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]") {
        pb.set_style(style);
    }
    pb.set_message(label.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

fn apply_patch(patch: &PatchStep, work_root: &Path) -> Result<(), BuildToolError> {
    let path = work_root.join(&patch.file);

    let replaced = replace_in_file(&path, &patch.search, &patch.replace).map_err(|e| {
        BuildToolError::PatchFailed {
            file: patch.file.clone(),
            message: format!("{:#}", e),
        }
    })?;

    if replaced {
        tracing::debug!("patched {}", patch.file.display());
    } else {
        tracing::warn!(
            "pattern {:?} not found in {}, leaving it unchanged",
            patch.search,
            patch.file.display()
        );
    }
    Ok(())
}

fn apply_rename(rename: &RenameStep, work_root: &Path) -> Result<(), BuildToolError> {
    let from = work_root.join(&rename.from);
    if rename.if_exists && !from.exists() {
        tracing::debug!("{} not produced, skipping rename", rename.from.display());
        return Ok(());
    }

    move_file(&from, &work_root.join(&rename.to)).map_err(|e| BuildToolError::RenameFailed {
        from: rename.from.clone(),
        to: rename.to.clone(),
        message: format!("{:#}", e),
    })
}
