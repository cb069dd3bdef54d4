//! Feature toggles.
//!
//! Every recipe declares a fixed [`FeatureSchema`]. The host supplies a
//! [`FeatureSet`] of boolean assignments; resolving it against the schema
//! rejects unknown keys and yields [`ResolvedFeatures`], which remembers
//! whether each value came from the documented default, from the host, or
//! from a forced override.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::errors::ConfigError;

/// A declared feature of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureDecl {
    pub name: &'static str,
    /// Documented default when the host leaves the feature unset
    pub default: bool,
    pub description: &'static str,
}

/// The ordered set of features a recipe accepts for a given profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureSchema {
    recipe: &'static str,
    decls: Vec<FeatureDecl>,
}

impl FeatureSchema {
    pub fn new(recipe: &'static str) -> Self {
        FeatureSchema {
            recipe,
            decls: Vec::new(),
        }
    }

    /// Declare a feature.
    pub fn feature(mut self, name: &'static str, default: bool, description: &'static str) -> Self {
        self.decls.push(FeatureDecl {
            name,
            default,
            description,
        });
        self
    }

    pub fn recipe(&self) -> &'static str {
        self.recipe
    }

    pub fn get(&self, name: &str) -> Option<&FeatureDecl> {
        self.decls.iter().find(|d| d.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureDecl> {
        self.decls.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.decls.iter().map(|d| d.name.to_string()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

/// Feature assignments as supplied by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSet {
    values: BTreeMap<String, bool>,
}

impl FeatureSet {
    pub fn new() -> Self {
        FeatureSet::default()
    }

    /// Builder-style assignment.
    pub fn with(mut self, name: impl Into<String>, value: bool) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: bool) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<bool> {
        self.values.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parse a `name=value` assignment.
    ///
    /// Accepts `true/false`, `True/False`, `on/off`, `yes/no` and `1/0`.
    /// A bare `name` means `name=true`.
    pub fn parse_assignment(input: &str) -> Result<(String, bool), ConfigError> {
        let invalid = || ConfigError::InvalidAssignment {
            input: input.to_string(),
        };

        let (name, value) = match input.split_once('=') {
            Some((name, value)) => (name.trim(), value.trim()),
            None => (input.trim(), "true"),
        };

        if name.is_empty() {
            return Err(invalid());
        }

        let value = match value.to_lowercase().as_str() {
            "true" | "on" | "yes" | "1" => true,
            "false" | "off" | "no" | "0" => false,
            _ => return Err(invalid()),
        };

        Ok((name.to_string(), value))
    }

    /// Build a feature set from `name=value` assignments; later ones win.
    pub fn from_assignments<I, S>(assignments: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = FeatureSet::new();
        for assignment in assignments {
            let (name, value) = Self::parse_assignment(assignment.as_ref())?;
            set.set(name, value);
        }
        Ok(set)
    }

    /// Merge another set into this one (other takes precedence).
    pub fn merge(&mut self, other: &FeatureSet) {
        for (name, value) in other.iter() {
            self.set(name, value);
        }
    }
}

impl From<BTreeMap<String, bool>> for FeatureSet {
    fn from(values: BTreeMap<String, bool>) -> Self {
        FeatureSet { values }
    }
}

/// Where an effective feature value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureOrigin {
    Default,
    Explicit,
    Forced,
}

/// Effective value of one declared feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedFeature {
    pub name: &'static str,
    pub enabled: bool,
    pub origin: FeatureOrigin,
    /// Why the value was forced, for forced values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Validated effective values of every declared feature, in schema order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedFeatures {
    recipe: &'static str,
    entries: Vec<ResolvedFeature>,
}

impl ResolvedFeatures {
    /// Validate `features` against `schema`.
    ///
    /// Fails on the first key (in sorted order) the schema does not declare.
    pub fn resolve(schema: &FeatureSchema, features: &FeatureSet) -> Result<Self, ConfigError> {
        if let Some((unknown, _)) = features.iter().find(|(name, _)| !schema.contains(name)) {
            return Err(ConfigError::UnknownFeature {
                recipe: schema.recipe().to_string(),
                feature: unknown.to_string(),
                valid: schema.names(),
            });
        }

        let entries = schema
            .iter()
            .map(|decl| match features.get(decl.name) {
                Some(enabled) => ResolvedFeature {
                    name: decl.name,
                    enabled,
                    origin: FeatureOrigin::Explicit,
                    reason: None,
                },
                None => ResolvedFeature {
                    name: decl.name,
                    enabled: decl.default,
                    origin: FeatureOrigin::Default,
                    reason: None,
                },
            })
            .collect();

        Ok(ResolvedFeatures {
            recipe: schema.recipe(),
            entries,
        })
    }

    pub fn recipe(&self) -> &'static str {
        self.recipe
    }

    /// Effective value; undeclared features are disabled.
    pub fn enabled(&self, name: &str) -> bool {
        self.get(name).is_some_and(|f| f.enabled)
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedFeature> {
        self.entries.iter().find(|f| f.name == name)
    }

    /// Value set by the host or forced, `None` when the default applies.
    pub fn explicit(&self, name: &str) -> Option<bool> {
        self.get(name)
            .filter(|f| f.origin != FeatureOrigin::Default)
            .map(|f| f.enabled)
    }

    /// Force a declared feature to `value`.
    ///
    /// Returns true if the effective value changed.
    pub fn force(&mut self, name: &str, value: bool, reason: impl Into<String>) -> bool {
        match self.entries.iter_mut().find(|f| f.name == name) {
            Some(entry) if entry.enabled != value => {
                entry.enabled = value;
                entry.origin = FeatureOrigin::Forced;
                entry.reason = Some(reason.into());
                true
            }
            _ => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedFeature> {
        self.entries.iter()
    }

    /// Names of enabled features, in schema order.
    pub fn enabled_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().filter(|f| f.enabled).map(|f| f.name)
    }

    /// Features whose value was forced by an override.
    pub fn forced(&self) -> Vec<ResolvedFeature> {
        self.entries
            .iter()
            .filter(|f| f.origin == FeatureOrigin::Forced)
            .cloned()
            .collect()
    }
}
