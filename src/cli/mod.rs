//! Command-line interface for gt-hook.
//!
//! The clap types here only describe the command line. [`run`] does the
//! work and returns a [`CliOutput`] so the binary stays a thin wrapper.

mod run;


pub use run::{render_report, render_status, run, CliOutput};

use crate::hook::HookRequest;
use clap::{Args, Parser, Subcommand};

/// Attach work to your hook.
///
/// The hook is the single bead pinned to you. Hooking a new bead replaces a
/// completed occupant automatically; an incomplete one needs `--force`.
#[derive(Parser, Debug)]
#[command(name = "gt-hook")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Attach a bead to your hook.
    ///
    /// Examples:
    ///   gt-hook hook gt-abc                  # Attach issue gt-abc
    ///   gt-hook hook gt-abc -s "Fix bug"     # With subject for handoff
    ///   gt-hook hook gt-abc --force          # Replace unfinished work
    Hook(HookArgs),

    /// Show what is on your hook.
    Status {
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Print version information.
    Version,
}

/// Arguments for `gt-hook hook`.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct HookArgs {
    /// Bead to attach
    pub bead_id: String,

    /// Subject for handoff mail
    #[arg(short, long)]
    pub subject: Option<String>,

    /// Context message for handoff mail
    #[arg(short, long)]
    pub message: Option<String>,

    /// Show what would be done without changing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Replace existing incomplete pinned bead
    #[arg(short, long)]
    pub force: bool,

    /// Print machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

impl HookArgs {
    /// The library request these arguments describe.
    #[must_use]
    pub fn to_request(&self) -> HookRequest {
        HookRequest {
            bead_id: self.bead_id.clone(),
            subject: self.subject.clone(),
            message: self.message.clone(),
            dry_run: self.dry_run,
            force: self.force,
        }
    }
}
