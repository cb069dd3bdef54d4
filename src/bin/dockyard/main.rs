//! Dockyard CLI - build recipes for C/C++ libraries

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dockyard::ops::BuildToolError;
use dockyard::util::diagnostic::emit;
use dockyard::ConfigError;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stderr().is_terminal();

    if let Err(e) = run(cli, color) {
        report(&e, color);
        std::process::exit(1);
    }
}

fn run(cli: Cli, color: bool) -> Result<()> {
    let filter = if cli.verbose {
        EnvFilter::new("dockyard=debug")
    } else {
        EnvFilter::new("dockyard=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(color)
        .with_target(false)
        .without_time()
        .init();

    let global = commands::GlobalArgs {
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::List => commands::list::execute(),
        Commands::Options(args) => commands::options::execute(args),
        Commands::Plan(args) => commands::plan::execute(args),
        Commands::Info(args) => commands::info::execute(args),
        Commands::Build(args) => commands::build::execute(args, &global),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Print an error, using the structured diagnostic when one exists.
fn report(e: &anyhow::Error, color: bool) {
    if let Some(config) = e.downcast_ref::<ConfigError>() {
        emit(&config.to_diagnostic(), color);
    } else if let Some(tool) = e.downcast_ref::<BuildToolError>() {
        emit(&tool.to_diagnostic(), color);
    } else {
        eprintln!("error: {:#}", e);
    }
}
