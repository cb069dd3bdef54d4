//! `dockyard build` command

use anyhow::Result;

use crate::cli::BuildArgs;
use crate::commands::{load_profile, GlobalArgs};
use dockyard::ops::{build, BuildOptions};
use dockyard::{GlobalContext, RecipeRegistry};

pub fn execute(args: BuildArgs, global: &GlobalArgs) -> Result<()> {
    let registry = RecipeRegistry::new();
    let recipe = registry.get(&args.recipe)?;
    let (profile, features) = load_profile(&args.profile)?;

    let mut ctx = GlobalContext::new()?;
    ctx.set_verbose(global.verbose);

    let opts = BuildOptions {
        jobs: args.jobs,
        out_dir: args.out,
        keep_work: args.keep_work,
    };

    let result = build(&ctx, recipe, &profile, &features, &opts)?;

    eprintln!(
        "    Finished {} {} -> {}",
        result.info.name,
        result.info.version,
        result.package_dir.display()
    );
    if let Some(ref work_dir) = result.work_dir {
        eprintln!("    Work dir {}", work_dir.display());
    }
    if !result.missing.is_empty() {
        eprintln!(
            "warning: {} expected librar{} missing: {}",
            result.missing.len(),
            if result.missing.len() == 1 { "y" } else { "ies" },
            result.missing.join(", ")
        );
    }

    Ok(())
}
