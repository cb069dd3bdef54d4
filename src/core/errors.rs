//! Configuration error types and diagnostics.

use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// An inconsistent or unsupported combination of settings and features.
///
/// Raised before any external tool is invoked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown feature `{feature}` for recipe `{recipe}`")]
    UnknownFeature {
        recipe: String,
        feature: String,
        valid: Vec<String>,
    },

    #[error("unknown recipe `{name}`")]
    UnknownRecipe { name: String, available: Vec<String> },

    #[error("missing setting `{setting}`")]
    MissingSetting { setting: String },

    #[error("invalid value `{value}` for setting `{setting}`")]
    InvalidSetting {
        setting: String,
        value: String,
        expected: Vec<String>,
    },

    #[error("inconsistent profile: {message}")]
    InconsistentProfile { message: String },

    #[error("recipe `{recipe}` does not support {what}")]
    Unsupported { recipe: String, what: String },

    #[error("invalid feature assignment `{input}`")]
    InvalidAssignment { input: String },
}

impl ConfigError {
    /// Shorthand for an invalid setting value.
    pub fn invalid_setting(
        setting: impl Into<String>,
        value: impl Into<String>,
        expected: &[&str],
    ) -> Self {
        ConfigError::InvalidSetting {
            setting: setting.into(),
            value: value.into(),
            expected: expected.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Shorthand for an inconsistent profile.
    pub fn inconsistent(message: impl Into<String>) -> Self {
        ConfigError::InconsistentProfile {
            message: message.into(),
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ConfigError::UnknownFeature {
                recipe,
                feature,
                valid,
            } => {
                let mut diag = Diagnostic::error(format!(
                    "`{}` is not a feature of `{}`",
                    feature, recipe
                ));

                if !valid.is_empty() {
                    diag = diag.with_context(format!("valid features: {}", valid.join(", ")));
                }

                diag.with_suggestion(format!(
                    "Run `dockyard options {}` to list features for this profile",
                    recipe
                ))
            }

            ConfigError::UnknownRecipe { name, available } => {
                Diagnostic::error(format!("no recipe named `{}`", name))
                    .with_context(format!("available recipes: {}", available.join(", ")))
                    .with_suggestion("Run `dockyard list` to see all recipes".to_string())
            }

            ConfigError::MissingSetting { setting } => {
                Diagnostic::error(format!("setting `{}` is required", setting))
                    .with_suggestion(format!(
                        "Pass `--{}` or set it in a profile file",
                        setting.replace('.', "-").replace('_', "-")
                    ))
            }

            ConfigError::InvalidSetting {
                setting,
                value,
                expected,
            } => {
                let mut diag = Diagnostic::error(format!(
                    "`{}` is not a valid value for `{}`",
                    value, setting
                ));
                if !expected.is_empty() {
                    diag = diag.with_context(format!("expected one of: {}", expected.join(", ")));
                }
                diag
            }

            ConfigError::InconsistentProfile { message } => {
                Diagnostic::error(format!("inconsistent profile: {}", message))
                    .with_suggestion("Check the os/compiler/arch combination".to_string())
            }

            ConfigError::Unsupported { recipe, what } => {
                Diagnostic::error(format!("`{}` cannot be built for {}", recipe, what))
            }

            ConfigError::InvalidAssignment { input } => {
                Diagnostic::error(format!("cannot parse feature assignment `{}`", input))
                    .with_suggestion("Write options as `-o name=true` or `-o name=false`".to_string())
            }
        }
    }
}
