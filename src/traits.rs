//! Core traits for testability and abstraction.

use crate::beads::{Bead, ListFilter, Progress};
use crate::error::Result;

/// Output from a command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// The exit code of the command.
    pub exit_code: i32,
    /// The stdout output.
    pub stdout: String,
    /// The stderr output.
    pub stderr: String,
}

impl CommandOutput {
    /// Check if the command succeeded (exit code 0).
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Build a successful output carrying `stdout`.
    #[must_use]
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self { exit_code: 0, stdout: stdout.into(), stderr: String::new() }
    }

    /// Build a failed output carrying `stderr`.
    #[must_use]
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self { exit_code, stdout: String::new(), stderr: stderr.into() }
    }
}

/// Trait for running external commands.
///
/// This trait abstracts command execution for testability.
pub trait CommandRunner {
    /// Run `program` with `args` and capture its output.
    ///
    /// A non-zero exit is not an error at this level; callers inspect
    /// [`CommandOutput::success`].
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned.
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput>;
}

/// Access to the bead store.
///
/// Queries and each mutation are separate methods so a test double can
/// fail any single step of a replace sequence.
pub trait BeadStore {
    /// Fail with [`crate::error::Error::NotFound`] unless `id` exists.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown ids, or the underlying store error.
    fn verify_exists(&self, id: &str) -> Result<()>;

    /// List beads matching `filter`, in store order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn list(&self, filter: &ListFilter) -> Result<Vec<Bead>>;

    /// Summarize the steps of the molecule rooted at `molecule`.
    ///
    /// Implementations never return [`Progress::Unknown`]; a failed lookup
    /// is an `Err`, which the classifier folds into `Unknown` itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the molecule or its steps cannot be read.
    fn molecule_progress(&self, molecule: &str) -> Result<Progress>;

    /// Set `id` to `pinned` with `assignee` as its owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the update.
    fn pin(&self, id: &str, assignee: &str) -> Result<()>;

    /// Return `id` to `open`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the update.
    fn unpin(&self, id: &str) -> Result<()>;

    /// Close `id`, recording `reason`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the closure.
    fn close(&self, id: &str, reason: &str) -> Result<()>;
}

/// Resolves who is calling.
pub trait IdentityResolver {
    /// Return the calling agent's identity.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::IdentityUnresolved`] when no identity
    /// source is available.
    fn resolve_self(&self) -> Result<String>;
}
