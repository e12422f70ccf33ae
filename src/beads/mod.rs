//! Bead data model.
//!
//! Beads are the work items tracked by the `bd` CLI. This module holds the
//! subset of a bead the hook command reads, the status vocabulary, and the
//! list filter used to find hook occupants and molecule steps.

mod attachment;
mod progress;
mod store;

pub use attachment::{Attachment, MoleculeAttachment};
pub use progress::Progress;
pub use store::{BdStore, CLOSE_REASON};

use serde::{Deserialize, Deserializer, Serialize};

/// Bead status.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BeadStatus {
    /// Available for work.
    #[default]
    Open,
    /// Someone is working on it.
    InProgress,
    /// Waiting on a dependency.
    Blocked,
    /// On an agent's hook.
    Pinned,
    /// Finished; terminal.
    Closed,
    /// Any status this tool does not interpret.
    Other(String),
}

impl BeadStatus {
    /// The string `bd` uses for this status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Blocked => "blocked",
            Self::Pinned => "pinned",
            Self::Closed => "closed",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for BeadStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "open" => Self::Open,
            "in_progress" => Self::InProgress,
            "blocked" => Self::Blocked,
            "pinned" => Self::Pinned,
            "closed" => Self::Closed,
            _ => Self::Other(s),
        }
    }
}

impl From<BeadStatus> for String {
    fn from(status: BeadStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for BeadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bead as returned by `bd show --json` / `bd list --json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bead {
    /// Unique id (e.g. `gt-abc`).
    pub id: String,
    /// Short title.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    /// Current status.
    #[serde(default)]
    pub status: BeadStatus,
    /// Owning agent; empty when unassigned.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub assignee: String,
    /// Free-form description; attachment fields live here.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    /// Priority, 0 (critical) to 4 (backlog).
    #[serde(default)]
    pub priority: Option<u8>,
}

impl Bead {
    /// Create a bead with the given id, title and status; other fields empty.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>, status: BeadStatus) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status,
            assignee: String::new(),
            description: String::new(),
            priority: None,
        }
    }

    /// Builder-style assignee setter.
    #[must_use]
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = assignee.into();
        self
    }

    /// Builder-style description setter.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// The molecule attached to this bead, if any.
    #[must_use]
    pub fn attachment(&self) -> Attachment {
        Attachment::parse(&self.description)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Which statuses a listing includes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusFilter {
    /// Only beads in this status.
    Only(BeadStatus),
    /// Every status, closed included.
    All,
}

/// Filter for [`crate::traits::BeadStore::list`].
///
/// `None` fields do not constrain the listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    /// Status constraint.
    pub status: Option<StatusFilter>,
    /// Exact assignee.
    pub assignee: Option<String>,
    /// Exact priority.
    pub priority: Option<u8>,
    /// Parent bead (molecule root).
    pub parent: Option<String>,
}

impl ListFilter {
    /// Beads pinned to `agent`: the occupants of its hook.
    #[must_use]
    pub fn pinned_to(agent: &str) -> Self {
        Self {
            status: Some(StatusFilter::Only(BeadStatus::Pinned)),
            assignee: Some(agent.to_string()),
            ..Self::default()
        }
    }

    /// Every step of the molecule rooted at `molecule`, whatever its status.
    #[must_use]
    pub fn steps_of(molecule: &str) -> Self {
        Self {
            status: Some(StatusFilter::All),
            parent: Some(molecule.to_string()),
            ..Self::default()
        }
    }

    /// Whether `bead` satisfies the status, assignee and priority constraints.
    ///
    /// The parent constraint cannot be checked from a [`Bead`] alone and is
    /// left to the store.
    #[must_use]
    pub fn matches(&self, bead: &Bead) -> bool {
        let status_ok = match &self.status {
            None | Some(StatusFilter::All) => true,
            Some(StatusFilter::Only(status)) => &bead.status == status,
        };
        let assignee_ok = self.assignee.as_ref().map_or(true, |a| &bead.assignee == a);
        let priority_ok = self.priority.map_or(true, |p| bead.priority == Some(p));
        status_ok && assignee_ok && priority_ok
    }
}
