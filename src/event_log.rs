//! Hook event logging.
//!
//! When `debug_logging` is enabled in the project config, every hook
//! invocation is appended as a JSONL line to `.gt/hook-events.jsonl` under
//! the workspace root, recording the decision and the mutations planned, or
//! the error that stopped it.

use crate::config::ProjectConfig;
use crate::error::Result;
use crate::hook::HookReport;
use crate::paths;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Log file name within the data directory.
pub const HOOK_EVENTS_FILE: &str = "hook-events.jsonl";

/// Path of the event log for a workspace root.
#[must_use]
pub fn log_path(workspace_root: &Path) -> PathBuf {
    paths::data_dir(workspace_root).join(HOOK_EVENTS_FILE)
}

/// Log the outcome of hooking `bead_id` if debug logging is enabled.
///
/// Errors are silently ignored; logging should never change the result of
/// a hook.
pub fn log_hook_outcome(
    workspace_root: &Path,
    config: &ProjectConfig,
    bead_id: &str,
    outcome: &Result<HookReport>,
) {
    if !config.debug_logging {
        return;
    }

    let timestamp = chrono::Utc::now().to_rfc3339();
    let entry = match outcome {
        Ok(report) => serde_json::json!({
            "timestamp": timestamp,
            "bead": bead_id,
            "agent": report.agent,
            "decision": report.decision.name(),
            "dry_run": report.dry_run,
            "actions": report.actions,
        }),
        Err(e) => serde_json::json!({
            "timestamp": timestamp,
            "bead": bead_id,
            "error": e.to_string(),
        }),
    };

    write_entry(&entry, workspace_root);
}

fn write_entry(entry: &serde_json::Value, workspace_root: &Path) {
    if std::fs::create_dir_all(paths::data_dir(workspace_root)).is_err() {
        return;
    }

    let Ok(mut file) =
        OpenOptions::new().create(true).append(true).open(log_path(workspace_root))
    else {
        return;
    };

    let _ = writeln!(file, "{entry}");
}
