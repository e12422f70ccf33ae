//! Completion classification for the bead currently on a hook.

use crate::beads::{Attachment, Bead, Progress};
use crate::traits::BeadStore;
use serde::Serialize;

/// Whether a hooked bead's work is finished, and whether a molecule was
/// attached to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Completion {
    /// Nothing is left to do on the bead.
    pub complete: bool,
    /// The bead carries a molecule attachment.
    pub has_attachment: bool,
    /// Progress of the attached molecule; `None` for naked beads.
    pub progress: Option<Progress>,
}

impl Completion {
    /// A naked bead has nothing to finish.
    pub const NAKED: Self = Self { complete: true, has_attachment: false, progress: None };

    /// Classification of a bead whose molecule reports `progress`.
    ///
    /// `Unknown` progress is incomplete, so an unreadable molecule can block
    /// a hook but never gets silently replaced.
    #[must_use]
    pub const fn of_molecule(progress: Progress) -> Self {
        Self { complete: progress.is_complete(), has_attachment: true, progress: Some(progress) }
    }
}

/// Classify `bead`, querying `store` for its molecule's progress.
///
/// Never fails: a failed progress lookup is folded into an incomplete
/// result.
pub fn classify(bead: &Bead, store: &dyn BeadStore) -> Completion {
    match bead.attachment() {
        Attachment::None => Completion::NAKED,
        Attachment::Molecule(attached) => {
            let molecule = attached.id;
            let progress = Progress::from_lookup(&molecule, store.molecule_progress(&molecule));
            tracing::debug!(bead = %bead.id, %molecule, %progress, "classified hooked bead");
            Completion::of_molecule(progress)
        }
    }
}
