//! `dockyard options` command

use anyhow::Result;

use crate::cli::OptionsArgs;
use crate::commands::load_profile;
use dockyard::builder::recipe::resolve_features;
use dockyard::RecipeRegistry;

pub fn execute(args: OptionsArgs) -> Result<()> {
    let registry = RecipeRegistry::new();
    let recipe = registry.get(&args.recipe)?;
    let (profile, features) = load_profile(&args.profile)?;

    let schema = recipe.features(&profile);
    let resolved = resolve_features(recipe, &profile, &features)?;

    println!("{} {} for {}", recipe.name(), recipe.version(), profile);
    println!();

    let width = schema.iter().map(|d| d.name.len()).max().unwrap_or(0);
    for decl in schema.iter() {
        let effective = resolved.enabled(decl.name);
        let marker = if effective != decl.default { "*" } else { " " };
        println!(
            "  {:<width$}  {:<5}{} {}",
            decl.name,
            effective,
            marker,
            decl.description,
            width = width
        );
    }

    if schema.is_empty() {
        println!("  (no features)");
    }

    Ok(())
}
