//! `dockyard info` command

use anyhow::{Context, Result};

use crate::cli::InfoArgs;
use crate::commands::load_profile;
use dockyard::builder::package_info;
use dockyard::RecipeRegistry;

pub fn execute(args: InfoArgs) -> Result<()> {
    let registry = RecipeRegistry::new();
    let recipe = registry.get(&args.recipe)?;
    let (profile, features) = load_profile(&args.profile)?;

    let info = package_info(recipe, &profile, &features)?;

    if args.json {
        let json = serde_json::to_string_pretty(&info).context("failed to serialize package info")?;
        println!("{}", json);
        return Ok(());
    }

    println!("{} {} ({})", info.name, info.version, recipe.license());
    println!("profile:   {}", info.profile);
    if info.header_only {
        println!("header-only");
    }
    print_list("libs", &info.libs);
    print_list("files", &info.lib_files);
    print_list("defines", &info.defines);
    print_list("requires", &info.requires);

    Ok(())
}

fn print_list(label: &str, values: &[String]) {
    if !values.is_empty() {
        println!("{:<10} {}", format!("{}:", label), values.join(" "));
    }
}
