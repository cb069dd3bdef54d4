//! Build plan generation.
//!
//! A BuildPlan describes every step needed to turn an extracted upstream
//! source tree into build outputs: external tool invocations, literal source
//! patches and file renames. It is produced by a recipe's translator and
//! consumed once by the executor.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::builder::command::{quote, CommandSpec};
use crate::core::features::ResolvedFeature;

/// How a tool receives its parallel job count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "style", content = "flag", rename_all = "snake_case")]
pub enum JobsFlag {
    /// Count glued to the flag (`-j8`)
    Attached(&'static str),
    /// Count as a separate token (`--parallel 8`)
    Separate(&'static str),
}

impl JobsFlag {
    pub fn tokens(&self, jobs: usize) -> Vec<String> {
        match self {
            JobsFlag::Attached(flag) => vec![format!("{}{}", flag, jobs)],
            JobsFlag::Separate(flag) => vec![flag.to_string(), jobs.to_string()],
        }
    }
}

/// Run an external tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunStep {
    /// Short description for logs
    pub label: String,
    pub command: CommandSpec,
    /// Working directory, relative to the work root
    pub cwd: PathBuf,
    /// Job flag form, if the tool builds in parallel
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobs: Option<JobsFlag>,
    /// Log file the tool writes, relative to `cwd`, dumped on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl RunStep {
    pub fn new(label: impl Into<String>, cwd: impl Into<PathBuf>, command: CommandSpec) -> Self {
        RunStep {
            label: label.into(),
            command,
            cwd: cwd.into(),
            jobs: None,
            log_file: None,
        }
    }

    pub fn with_jobs(mut self, jobs: JobsFlag) -> Self {
        self.jobs = Some(jobs);
        self
    }

    pub fn with_log(mut self, log_file: impl Into<PathBuf>) -> Self {
        self.log_file = Some(log_file.into());
        self
    }

    /// The command with the job flag appended.
    pub fn command_with_jobs(&self, jobs: usize) -> CommandSpec {
        match &self.jobs {
            Some(flag) => self.command.clone().args(flag.tokens(jobs)),
            None => self.command.clone(),
        }
    }
}

/// Literal search/replace in a file of the source tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchStep {
    /// File to patch, relative to the work root
    pub file: PathBuf,
    pub search: String,
    pub replace: String,
}

/// Move a produced file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameStep {
    /// Source path, relative to the work root
    pub from: PathBuf,
    /// Destination path, relative to the work root
    pub to: PathBuf,
    /// Skip silently when `from` does not exist
    pub if_exists: bool,
}

/// A build step in the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BuildStep {
    Run(RunStep),
    Patch(PatchStep),
    Rename(RenameStep),
}

/// A complete build plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildPlan {
    pub recipe: String,
    pub version: String,
    /// Profile identity the plan was translated for
    pub profile: String,
    /// Directory holding the upstream sources, relative to the work root
    pub source_dir: PathBuf,
    /// All build steps in execution order
    pub steps: Vec<BuildStep>,
    /// Environment applied to every run step
    pub env: BTreeMap<String, String>,
    /// Tokens derived from feature toggles
    pub feature_flags: Vec<String>,
    /// Feature values overridden during translation
    pub forced: Vec<ResolvedFeature>,
}

impl BuildPlan {
    /// Create an empty plan.
    pub fn new(
        recipe: impl Into<String>,
        version: impl Into<String>,
        profile: impl Into<String>,
        source_dir: impl Into<PathBuf>,
    ) -> Self {
        BuildPlan {
            recipe: recipe.into(),
            version: version.into(),
            profile: profile.into(),
            source_dir: source_dir.into(),
            steps: Vec::new(),
            env: BTreeMap::new(),
            feature_flags: Vec::new(),
            forced: Vec::new(),
        }
    }

    /// A plan without steps: nothing needs compiling.
    pub fn is_header_only(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn run(&mut self, step: RunStep) -> &mut Self {
        self.steps.push(BuildStep::Run(step));
        self
    }

    pub fn patch(
        &mut self,
        file: impl Into<PathBuf>,
        search: impl Into<String>,
        replace: impl Into<String>,
    ) -> &mut Self {
        self.steps.push(BuildStep::Patch(PatchStep {
            file: file.into(),
            search: search.into(),
            replace: replace.into(),
        }));
        self
    }

    pub fn rename(
        &mut self,
        from: impl Into<PathBuf>,
        to: impl Into<PathBuf>,
        if_exists: bool,
    ) -> &mut Self {
        self.steps.push(BuildStep::Rename(RenameStep {
            from: from.into(),
            to: to.into(),
            if_exists,
        }));
        self
    }

    pub fn env(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Run steps in order.
    pub fn run_steps(&self) -> impl Iterator<Item = &RunStep> {
        self.steps.iter().filter_map(|s| match s {
            BuildStep::Run(run) => Some(run),
            _ => None,
        })
    }

    /// Find a run step by label.
    pub fn run_step(&self, label: &str) -> Option<&RunStep> {
        self.run_steps().find(|s| s.label == label)
    }

    /// Render the plan as a POSIX shell script, for review.
    pub fn render_shell(&self, jobs: usize) -> String {
        let mut out = format!(
            "# {} {} for {}\n",
            self.recipe, self.version, self.profile
        );

        if self.is_header_only() {
            out.push_str("# header-only: nothing to build\n");
            return out;
        }

        for (key, value) in &self.env {
            out.push_str(&format!("export {}={}\n", key, quote(value)));
        }

        for step in &self.steps {
            match step {
                BuildStep::Run(run) => {
                    out.push_str(&format!("# {}\n", run.label));
                    out.push_str(&format!(
                        "(cd {} && {})\n",
                        quote(&display_path(&run.cwd)),
                        run.command_with_jobs(jobs).render()
                    ));
                }
                BuildStep::Patch(patch) => {
                    out.push_str(&format!(
                        "# patch {}: {} -> {}\n",
                        display_path(&patch.file),
                        quote(&patch.search),
                        quote(&patch.replace)
                    ));
                }
                BuildStep::Rename(rename) => {
                    let guard = if rename.if_exists {
                        format!("[ -e {} ] && ", quote(&display_path(&rename.from)))
                    } else {
                        String::new()
                    };
                    out.push_str(&format!(
                        "{}mv {} {}\n",
                        guard,
                        quote(&display_path(&rename.from)),
                        quote(&display_path(&rename.to))
                    ));
                }
            }
        }

        out
    }
}

fn display_path(path: &Path) -> String {
    let s = path.display().to_string();
    if s.is_empty() {
        ".".to_string()
    } else {
        s
    }
}
