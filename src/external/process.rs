//! Subprocess plumbing shared by the external tools

use crate::error::{MinusOneError, Result};
use std::ffi::OsString;
use std::process::{Command, Output};
use tracing::debug;

/// Lines of stderr kept in a `ToolFailed` error
const STDERR_TAIL_LINES: usize = 20;

/// An external binary, overridable through an environment variable
#[derive(Debug, Clone)]
pub struct Tool {
    pub name: &'static str,
    pub env_var: &'static str,
    pub program: OsString,
}

impl Tool {
    /// Resolve the program from `env_var`, falling back to `default`
    pub fn from_env(name: &'static str, env_var: &'static str, default: &str) -> Self {
        let program = std::env::var_os(env_var)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| OsString::from(default));
        Self {
            name,
            env_var,
            program,
        }
    }

    pub fn command(&self) -> Command {
        Command::new(&self.program)
    }

    /// True if `<program> --version` runs and succeeds
    pub fn is_available(&self) -> bool {
        self.command()
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// Run to completion, mapping spawn failures and non-zero exits to errors
    pub fn run(&self, cmd: &mut Command) -> Result<Output> {
        debug!("Running {:?}", cmd);

        let output = cmd.output().map_err(|e| MinusOneError::ToolUnavailable {
            tool: self.name,
            env_var: self.env_var,
            reason: e.to_string(),
        })?;

        if !output.status.success() {
            return Err(MinusOneError::ToolFailed {
                tool: self.name,
                status: output.status.to_string(),
                stderr: stderr_tail(&output.stderr),
            });
        }

        Ok(output)
    }
}

/// Last few lines of a process's stderr
fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}
