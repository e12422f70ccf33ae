//! [`BeadStore`] backed by the `bd` CLI.
//!
//! Every operation is a single `bd` invocation (progress takes two). Reads
//! use `--json`; writes check the exit status and surface stderr.

use super::{Bead, ListFilter, Progress, StatusFilter};
use crate::error::{Error, Result};
use crate::traits::{BeadStore, CommandOutput, CommandRunner};
use serde::Deserialize;

/// Reason recorded when a bead with a finished molecule is closed to make
/// room on the hook.
pub const CLOSE_REASON: &str = "Auto-replaced by gt hook (molecule complete)";

/// Bead store that shells out to `bd`.
pub struct BdStore<'a> {
    runner: &'a dyn CommandRunner,
    program: String,
}

impl<'a> BdStore<'a> {
    /// Create a store invoking `program` (normally `bd`) through `runner`.
    pub fn new(runner: &'a dyn CommandRunner, program: impl Into<String>) -> Self {
        Self { runner, program: program.into() }
    }

    fn run(&self, args: &[&str]) -> Result<CommandOutput> {
        self.runner.run(&self.program, args)
    }

    fn run_checked(&self, args: &[&str]) -> Result<CommandOutput> {
        let output = self.run(args)?;
        if output.success() {
            Ok(output)
        } else {
            Err(Error::CommandFailed {
                command: format!("{} {}", self.program, args.join(" ")),
                exit_code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            })
        }
    }
}

/// Build the `bd list` arguments for `filter`.
fn list_args(filter: &ListFilter) -> Vec<String> {
    let mut args = vec!["list".to_string()];
    match &filter.status {
        Some(StatusFilter::Only(status)) => args.push(format!("--status={status}")),
        Some(StatusFilter::All) => args.push("--status=all".to_string()),
        None => {}
    }
    if let Some(assignee) = &filter.assignee {
        args.push(format!("--assignee={assignee}"));
    }
    if let Some(priority) = filter.priority {
        args.push(format!("--priority={priority}"));
    }
    if let Some(parent) = &filter.parent {
        args.push(format!("--parent={parent}"));
    }
    args.push("--json".to_string());
    args
}

/// Decode `bd show --json`, which emits either one object or an array.
fn decode_show(stdout: &str) -> Result<Option<Bead>> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Shown {
        One(Box<Bead>),
        Many(Vec<Bead>),
    }

    Ok(match serde_json::from_str::<Shown>(stdout)? {
        Shown::One(bead) => Some(*bead),
        Shown::Many(beads) => beads.into_iter().next(),
    })
}

/// Decode `bd list --json`. Empty output means no matches.
fn decode_list(stdout: &str) -> Result<Vec<Bead>> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(trimmed)?)
}

impl BeadStore for BdStore<'_> {
    fn verify_exists(&self, id: &str) -> Result<()> {
        let output = self.run(&["show", id, "--json"])?;
        let found = output.success()
            && match decode_show(&output.stdout) {
                Ok(bead) => bead.is_some(),
                Err(e) => {
                    tracing::debug!(id, error = %e, "bd show output not understood");
                    false
                }
            };
        if found {
            Ok(())
        } else {
            Err(Error::NotFound { id: id.to_string() })
        }
    }

    fn list(&self, filter: &ListFilter) -> Result<Vec<Bead>> {
        let args = list_args(filter);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = self.run_checked(&args)?;
        decode_list(&output.stdout)
    }

    fn molecule_progress(&self, molecule: &str) -> Result<Progress> {
        let output = self.run_checked(&["show", molecule, "--json"])?;
        if decode_show(&output.stdout)?.is_none() {
            return Err(Error::NotFound { id: molecule.to_string() });
        }
        let steps = self.list(&ListFilter::steps_of(molecule))?;
        Ok(Progress::from_steps(&steps))
    }

    fn pin(&self, id: &str, assignee: &str) -> Result<()> {
        let assignee = format!("--assignee={assignee}");
        self.run_checked(&["update", id, "--status=pinned", assignee.as_str()]).map(drop)
    }

    fn unpin(&self, id: &str) -> Result<()> {
        self.run_checked(&["update", id, "--status=open"]).map(drop)
    }

    fn close(&self, id: &str, reason: &str) -> Result<()> {
        let reason = format!("--reason={reason}");
        self.run_checked(&["close", id, "--force", reason.as_str()]).map(drop)
    }
}
