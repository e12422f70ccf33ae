//! Error types for `gt_hook`.

use std::path::PathBuf;

/// Errors that can occur while hooking work.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The calling agent's class may not hook work.
    #[error("ephemeral workers cannot hook work ({agent}); use `gt done` for handoff")]
    PreconditionDenied {
        /// Name of the ephemeral worker that attempted the hook.
        agent: String,
    },

    /// The requested bead does not exist.
    #[error("bead not found: {id}")]
    NotFound {
        /// The requested bead id.
        id: String,
    },

    /// The calling agent's identity could not be determined.
    #[error("detecting agent identity: {0}")]
    IdentityUnresolved(String),

    /// An incomplete pinned bead occupies the hook and `--force` was not given.
    #[error(
        "existing pinned bead {id} is incomplete ({title})\n  \
         Use --force to replace, or complete the existing work first"
    )]
    Conflict {
        /// Id of the bead currently on the hook.
        id: String,
        /// Title of the bead currently on the hook.
        title: String,
    },

    /// The bead store rejected a status change or closure.
    #[error("{action} bead {id}: {source}")]
    MutationFailed {
        /// What was being attempted ("pinning", "unpinning", "closing").
        action: &'static str,
        /// The bead being mutated.
        id: String,
        /// The underlying failure.
        #[source]
        source: Box<Error>,
    },

    /// No `.beads/` directory was found above the working directory.
    #[error("not in a beads workspace (searched from {})", .0.display())]
    NotInWorkspace(PathBuf),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON parsing error occurred.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML parsing error occurred.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A command exited unsuccessfully.
    #[error("Command '{command}' failed with exit code {exit_code}: {stderr}")]
    CommandFailed {
        /// The command that was run.
        command: String,
        /// The exit code.
        exit_code: i32,
        /// The stderr output.
        stderr: String,
    },
}

impl Error {
    /// Wrap a store failure as a [`Error::MutationFailed`].
    pub fn mutation(action: &'static str, id: &str, source: Self) -> Self {
        Self::MutationFailed { action, id: id.to_string(), source: Box::new(source) }
    }
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
