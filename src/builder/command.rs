//! Structured command lines.
//!
//! Commands are assembled as token lists and handed to the process layer
//! unchanged. They are only flattened into a single string for display.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// A command to execute, with program, arguments, and environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSpec {
    /// The program to run (e.g., "cmake", "./b2")
    pub program: String,
    /// Command arguments, in order
    pub args: Vec<String>,
    /// Environment variables to set for this command only
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

impl CommandSpec {
    /// Create a new command spec.
    pub fn new(program: impl Into<String>) -> Self {
        CommandSpec {
            program: program.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
        }
    }

    /// Add an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(|a| a.into()));
        self
    }

    /// Add an argument only when `cond` holds.
    pub fn arg_if(self, cond: bool, arg: impl Into<String>) -> Self {
        if cond {
            self.arg(arg)
        } else {
            self
        }
    }

    /// Add an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Program followed by its arguments.
    pub fn tokens(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }

    /// Render as a single shell-quoted line.
    pub fn render(&self) -> String {
        let mut parts: Vec<String> = self
            .env
            .iter()
            .map(|(k, v)| format!("{}={}", k, quote(v)))
            .collect();
        parts.extend(self.tokens().into_iter().map(quote));
        parts.join(" ")
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Quote a token for POSIX shells if it contains anything unsafe.
pub fn quote(token: &str) -> String {
    let safe = !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./=:,+@%".contains(c));

    if safe {
        token.to_string()
    } else {
        format!("'{}'", token.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_order() {
        let cmd = CommandSpec::new("./b2")
            .arg("link=static")
            .args(["variant=release", "address-model=64"])
            .arg_if(false, "--with-python")
            .arg_if(true, "--abbreviate-paths");

        assert_eq!(
            cmd.tokens(),
            vec![
                "./b2",
                "link=static",
                "variant=release",
                "address-model=64",
                "--abbreviate-paths"
            ]
        );
    }

    #[test]
    fn test_render_quotes_whitespace() {
        let cmd = CommandSpec::new("./b2").arg("cxxflags=-fPIC -std=c++11");
        assert_eq!(cmd.render(), "./b2 'cxxflags=-fPIC -std=c++11'");
    }

    #[test]
    fn test_render_env_prefix() {
        let cmd = CommandSpec::new("make")
            .arg("-f")
            .arg("GNUmakefile-cross")
            .env("CXXFLAGS", "-O3 -fPIC");
        assert_eq!(cmd.render(), "CXXFLAGS='-O3 -fPIC' make -f GNUmakefile-cross");
    }

    #[test]
    fn test_quote_single_quote() {
        assert_eq!(quote("it's"), r"'it'\''s'");
        assert_eq!(quote(""), "''");
    }
}
