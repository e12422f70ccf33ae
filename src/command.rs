//! Real command execution implementation.

use crate::error::Result;
use crate::traits::{CommandOutput, CommandRunner};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Command runner that spawns real processes.
///
/// When a working directory is set, every command runs there; `bd` resolves
/// its database relative to the current directory, so the hook command pins
/// the runner to the discovered workspace root.
#[derive(Debug, Default, Clone)]
pub struct RealCommandRunner {
    working_dir: Option<PathBuf>,
}

impl RealCommandRunner {
    /// Create a runner that inherits the process working directory.
    #[must_use]
    pub const fn new() -> Self {
        Self { working_dir: None }
    }

    /// Create a runner that executes every command inside `dir`.
    #[must_use]
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self { working_dir: Some(dir.into()) }
    }

    /// The directory commands run in, if pinned.
    #[must_use]
    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }
}

impl CommandRunner for RealCommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        let mut command = Command::new(program);
        command.args(args).stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        tracing::trace!(program, ?args, "running command");
        let output = command.output()?;

        Ok(CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
