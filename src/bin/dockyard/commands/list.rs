//! `dockyard list` command

use anyhow::Result;

use dockyard::RecipeRegistry;

pub fn execute() -> Result<()> {
    let registry = RecipeRegistry::new();

    for recipe in registry.all() {
        println!(
            "{:<10} {:<8} {}",
            recipe.name(),
            recipe.version(),
            recipe.description()
        );
    }

    Ok(())
}
