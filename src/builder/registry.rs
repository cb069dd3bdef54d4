//! Recipe registry.

use std::collections::BTreeMap;

use crate::builder::recipe::Recipe;
use crate::builder::recipes::{Boost, CryptoPP, OpenSsl};
use crate::core::errors::ConfigError;

/// Registry of available recipes, keyed by lowercase name.
pub struct RecipeRegistry {
    recipes: BTreeMap<&'static str, Box<dyn Recipe>>,
}

impl RecipeRegistry {
    /// Create a registry with all built-in recipes.
    pub fn new() -> Self {
        let mut registry = RecipeRegistry {
            recipes: BTreeMap::new(),
        };

        registry.register(Box::new(Boost));
        registry.register(Box::new(CryptoPP));
        registry.register(Box::new(OpenSsl));

        registry
    }

    pub fn register(&mut self, recipe: Box<dyn Recipe>) {
        self.recipes.insert(recipe.name(), recipe);
    }

    /// Look up a recipe by name, ignoring case.
    pub fn get(&self, name: &str) -> Result<&dyn Recipe, ConfigError> {
        self.recipes
            .get(name.to_lowercase().as_str())
            .map(|r| r.as_ref())
            .ok_or_else(|| ConfigError::UnknownRecipe {
                name: name.to_string(),
                available: self.names().map(str::to_string).collect(),
            })
    }

    /// Recipe names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.recipes.keys().copied()
    }

    pub fn all(&self) -> impl Iterator<Item = &dyn Recipe> + '_ {
        self.recipes.values().map(|r| r.as_ref())
    }
}

impl Default for RecipeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
