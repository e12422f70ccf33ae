//! Molecule progress summaries.

use super::{Bead, BeadStatus};
use serde::Serialize;

/// How far along a molecule's steps are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Progress {
    /// The lookup failed; nothing is known.
    Unknown,
    /// The molecule has no discoverable steps.
    NoSteps,
    /// `closed` of `total` steps are closed.
    Steps {
        /// Number of steps.
        total: usize,
        /// Number of closed steps.
        closed: usize,
    },
}

impl Progress {
    /// Summarize a molecule's step beads.
    #[must_use]
    pub fn from_steps(steps: &[Bead]) -> Self {
        if steps.is_empty() {
            return Self::NoSteps;
        }
        let closed = steps.iter().filter(|s| s.status == BeadStatus::Closed).count();
        Self::Steps { total: steps.len(), closed }
    }

    /// Fold a lookup result, treating any failure as [`Progress::Unknown`].
    #[must_use]
    pub fn from_lookup<E: std::fmt::Display>(molecule: &str, lookup: Result<Self, E>) -> Self {
        lookup.unwrap_or_else(|e| {
            tracing::warn!(molecule, error = %e, "molecule progress unavailable; treating as incomplete");
            Self::Unknown
        })
    }

    /// Whether every step is closed. `Unknown` is never complete; a molecule
    /// with no steps always is.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        match self {
            Self::Unknown => false,
            Self::NoSteps => true,
            Self::Steps { total, closed } => *closed == *total,
        }
    }
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => f.write_str("progress unknown"),
            Self::NoSteps => f.write_str("no steps"),
            Self::Steps { total, closed } => write!(f, "{closed}/{total} steps closed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(id: &str, status: BeadStatus) -> Bead {
        Bead::new(id, id, status)
    }

    #[test]
    fn test_no_steps_is_complete() {
        assert_eq!(Progress::from_steps(&[]), Progress::NoSteps);
        assert!(Progress::NoSteps.is_complete());
    }

    #[test]
    fn test_all_closed_is_complete() {
        let steps = [step("s1", BeadStatus::Closed), step("s2", BeadStatus::Closed)];
        let progress = Progress::from_steps(&steps);
        assert_eq!(progress, Progress::Steps { total: 2, closed: 2 });
        assert!(progress.is_complete());
    }

    #[test]
    fn test_one_open_step_is_incomplete() {
        let steps = [
            step("s1", BeadStatus::Closed),
            step("s2", BeadStatus::InProgress),
            step("s3", BeadStatus::Other("deferred".to_string())),
        ];
        let progress = Progress::from_steps(&steps);
        assert_eq!(progress, Progress::Steps { total: 3, closed: 1 });
        assert!(!progress.is_complete());
        assert_eq!(progress.to_string(), "1/3 steps closed");
    }

    #[test]
    fn test_failed_lookup_folds_to_unknown() {
        let progress = Progress::from_lookup("mol-1", Err::<Progress, _>("bd exploded"));
        assert_eq!(progress, Progress::Unknown);
        assert!(!progress.is_complete());
    }

    #[test]
    fn test_successful_lookup_passes_through() {
        let progress = Progress::from_lookup::<String>("mol-1", Ok(Progress::NoSteps));
        assert_eq!(progress, Progress::NoSteps);
    }
}
