//! Turning a [`Decision`] into store mutations.
//!
//! A decision becomes an ordered list of [`Action`]s. The old occupant is
//! always cleared before the requested bead is pinned, and the first failed
//! action aborts the rest: a crash or error between the two steps leaves
//! the hook empty, never doubly occupied.

use super::Decision;
use crate::beads::CLOSE_REASON;
use crate::error::{Error, Result};
use crate::traits::BeadStore;
use serde::Serialize;

/// One store mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Close a bead whose molecule is finished.
    Close {
        /// Bead id.
        id: String,
        /// Recorded closure reason.
        reason: String,
    },
    /// Put a bead back to `open`.
    Unpin {
        /// Bead id.
        id: String,
    },
    /// Pin a bead to an agent's hook.
    Pin {
        /// Bead id.
        id: String,
        /// The agent.
        assignee: String,
    },
}

impl Action {
    /// Perform this action against `store`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MutationFailed`] wrapping the store's error.
    pub fn apply(&self, store: &dyn BeadStore) -> Result<()> {
        match self {
            Self::Close { id, reason } => {
                store.close(id, reason).map_err(|e| Error::mutation("closing completed", id, e))
            }
            Self::Unpin { id } => store.unpin(id).map_err(|e| Error::mutation("unpinning", id, e)),
            Self::Pin { id, assignee } => {
                store.pin(id, assignee).map_err(|e| Error::mutation("pinning", id, e))
            }
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Close { id, reason } => write!(f, "close {id} (reason: {reason})"),
            Self::Unpin { id } => write!(f, "set {id} back to open"),
            Self::Pin { id, assignee } => write!(f, "pin {id} to {assignee}"),
        }
    }
}

/// The actions `decision` calls for when `agent` hooks `requested`.
///
/// # Errors
///
/// Returns [`Error::Conflict`] for [`Decision::Block`].
pub fn plan(decision: &Decision, requested: &str, agent: &str) -> Result<Vec<Action>> {
    let pin = || Action::Pin { id: requested.to_string(), assignee: agent.to_string() };
    Ok(match decision {
        Decision::NoOp => Vec::new(),
        Decision::Proceed => vec![pin()],
        Decision::AutoReplace { existing, has_attachment: true } => vec![
            Action::Close { id: existing.id.clone(), reason: CLOSE_REASON.to_string() },
            pin(),
        ],
        Decision::AutoReplace { existing, has_attachment: false }
        | Decision::ForceReplace { existing } => {
            vec![Action::Unpin { id: existing.id.clone() }, pin()]
        }
        Decision::Block { existing } => {
            return Err(Error::Conflict { id: existing.id.clone(), title: existing.title.clone() })
        }
    })
}

/// Apply `actions` in order, stopping at the first failure.
///
/// # Errors
///
/// Returns the first action's [`Error::MutationFailed`]; later actions are
/// not attempted.
pub fn apply(actions: &[Action], store: &dyn BeadStore) -> Result<()> {
    for action in actions {
        tracing::debug!(%action, "applying");
        action.apply(store)?;
    }
    Ok(())
}
