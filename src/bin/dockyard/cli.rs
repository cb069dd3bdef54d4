//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// Dockyard - build recipes for C/C++ libraries
#[derive(Parser)]
#[command(name = "dockyard")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List available recipes
    List,

    /// Show the features a recipe accepts for a profile
    Options(OptionsArgs),

    /// Print the build plan without running anything
    Plan(PlanArgs),

    /// Show package info and exact artifact names
    Info(InfoArgs),

    /// Fetch, build and package a recipe
    Build(BuildArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Target settings and feature assignments, shared by every recipe command.
#[derive(Args, Debug, Clone, Default)]
pub struct ProfileArgs {
    /// Profile file with settings and [options]
    #[arg(long, value_name = "FILE", env = "DOCKYARD_PROFILE")]
    pub profile: Option<PathBuf>,

    /// Target operating system (Linux, Macos, Windows, iOS)
    #[arg(long)]
    pub os: Option<String>,

    /// Target architecture (x86, x86_64, armv7, armv7s, arm64)
    #[arg(long)]
    pub arch: Option<String>,

    /// Compiler (gcc, clang, apple-clang, visual-studio)
    #[arg(long)]
    pub compiler: Option<String>,

    /// Compiler version (e.g. 7.2.0, 15)
    #[arg(long)]
    pub compiler_version: Option<String>,

    /// MSVC runtime (MD, MT, MDd, MTd)
    #[arg(long)]
    pub runtime: Option<String>,

    /// C++ standard library (libstdc++, libstdc++11, libc++)
    #[arg(long)]
    pub libcxx: Option<String>,

    /// Build type (Debug, Release)
    #[arg(long)]
    pub build_type: Option<String>,

    /// Feature assignment, e.g. `-o shared=true` (repeatable)
    #[arg(short = 'o', long = "option", value_name = "NAME=VALUE")]
    pub options: Vec<String>,
}

#[derive(Args)]
pub struct OptionsArgs {
    /// Recipe name
    pub recipe: String,

    #[command(flatten)]
    pub profile: ProfileArgs,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum PlanFormat {
    /// Reviewable POSIX shell script
    #[default]
    Shell,
    /// Structured JSON
    Json,
}

#[derive(Args)]
pub struct PlanArgs {
    /// Recipe name
    pub recipe: String,

    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    pub format: PlanFormat,

    /// Job count shown in the plan
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

#[derive(Args)]
pub struct InfoArgs {
    /// Recipe name
    pub recipe: String,

    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Print the package info as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Recipe name
    pub recipe: String,

    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Package output directory
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Keep the work directory after a successful build
    #[arg(long)]
    pub keep_work: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
