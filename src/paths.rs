//! Workspace discovery.
//!
//! A beads workspace is any directory containing a `.beads/` directory. The
//! hook command runs `bd` from the workspace root and keeps its own files
//! under `<root>/.gt/`.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Marker directory identifying a beads workspace.
pub const BEADS_DIR_NAME: &str = ".beads";

/// Directory for this tool's config and logs, relative to the workspace root.
pub const DATA_DIR_NAME: &str = ".gt";

/// Find the nearest ancestor of `start` (inclusive) containing `.beads/`.
///
/// # Errors
///
/// Returns [`Error::NotInWorkspace`] if no ancestor qualifies.
pub fn find_workspace_root(start: &Path) -> Result<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(BEADS_DIR_NAME).is_dir())
        .map(Path::to_path_buf)
        .ok_or_else(|| Error::NotInWorkspace(start.to_path_buf()))
}

/// The data directory under a workspace root.
#[must_use]
pub fn data_dir(workspace_root: &Path) -> PathBuf {
    workspace_root.join(DATA_DIR_NAME)
}
