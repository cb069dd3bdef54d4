//! User-facing diagnostic messages.
//!
//! Every error shown to the user states what went wrong, the facts that led
//! to it, and what to try next.

use std::fmt;
use std::path::PathBuf;

/// Common suggestion messages.
pub mod suggestions {
    /// Suggestion when an external build tool fails.
    pub const BUILD_FAILED: &str = "Run `dockyard build --verbose` to see the full tool output";

    /// Suggestion when sources cannot be downloaded.
    pub const FETCH_FAILED: &str =
        "Check your network connection, or place the archive in the download cache";

    /// Suggestion when a download is needed in offline mode.
    pub const OFFLINE: &str = "Unset `net.offline` in .dockyard/config.toml to allow downloads";

    /// Suggestion when a tool is missing from PATH.
    pub const TOOL_NOT_FOUND: &str = "Install the tool or add its directory to PATH";
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    fn label(&self, color: bool) -> &'static str {
        match (self, color) {
            (Severity::Error, true) => "\x1b[1;31merror\x1b[0m",
            (Severity::Warning, true) => "\x1b[1;33mwarning\x1b[0m",
            (Severity::Error, false) => "error",
            (Severity::Warning, false) => "warning",
        }
    }
}

/// A diagnostic message with optional context and suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub message: String,
    pub severity: Severity,
    /// Facts that explain the message
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
    /// Related file, such as a dumped tool log
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Error)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Warning)
    }

    fn new(message: impl Into<String>, severity: Severity) -> Self {
        Diagnostic {
            message: message.into(),
            severity,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = format!("{}: {}\n", self.severity.label(color), self.message);

        if let Some(ref path) = self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }

        for line in &self.context {
            output.push_str(&format!("  = {}\n", line));
        }

        match self.suggestions.as_slice() {
            [] => {}
            [only] => output.push_str(&format!("help: {}\n", only)),
            many => {
                output.push_str("help: consider:\n");
                for (i, suggestion) in many.iter().enumerate() {
                    output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
                }
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_formatting() {
        let diag = Diagnostic::error("`b2` exited with status 1")
            .with_location("boost_1_64_0/bootstrap.log")
            .with_context("step: b2")
            .with_suggestion(suggestions::BUILD_FAILED);

        let output = diag.format(false);
        assert!(output.starts_with("error: `b2` exited with status 1\n"));
        assert!(output.contains("--> boost_1_64_0/bootstrap.log"));
        assert!(output.contains("= step: b2"));
        assert!(output.contains("help: Run `dockyard build --verbose`"));
    }

    #[test]
    fn test_multiple_suggestions_are_numbered() {
        let output = Diagnostic::warning("missing library")
            .with_suggestion("first")
            .with_suggestion("second")
            .format(false);

        assert!(output.starts_with("warning: missing library"));
        assert!(output.contains("help: consider:\n  1. first\n  2. second\n"));
    }
}
