//! `dockyard plan` command

use anyhow::{Context, Result};

use crate::cli::{PlanArgs, PlanFormat};
use crate::commands::load_profile;
use dockyard::ops::build::resolve_jobs;
use dockyard::util::config::{global_config_dir, load_config, project_config_path};
use dockyard::{translate, RecipeRegistry};

pub fn execute(args: PlanArgs) -> Result<()> {
    let registry = RecipeRegistry::new();
    let recipe = registry.get(&args.recipe)?;
    let (profile, features) = load_profile(&args.profile)?;

    let plan = translate(recipe, &profile, &features)?;

    match args.format {
        PlanFormat::Shell => {
            let cwd = std::env::current_dir().context("failed to get current directory")?;
            let global = global_config_dir().map(|dir| dir.join("config.toml"));
            let config = load_config(global.as_deref(), &project_config_path(&cwd));

            print!("{}", plan.render_shell(resolve_jobs(args.jobs, config.build.jobs)));
        }
        PlanFormat::Json => {
            let json = serde_json::to_string_pretty(&plan).context("failed to serialize plan")?;
            println!("{}", json);
        }
    }

    Ok(())
}
