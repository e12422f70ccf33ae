//! Command execution for the CLI.
//!
//! This module handles running CLI commands and producing output.

use crate::beads::{Attachment, BdStore};
use crate::cli::{Command, HookArgs};
use crate::command::RealCommandRunner;
use crate::config::ProjectConfig;
use crate::error::{Error, Result};
use crate::event_log;
use crate::hook::{hook_status, run_hook, Action, Decision, HookReport, HookStatus};
use crate::identity::{AgentClass, EnvIdentity};
use crate::paths;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

/// Output from running the CLI, with separate stdout and stderr messages.
#[derive(Debug)]
pub struct CliOutput {
    /// Exit code for the process.
    pub exit_code: ExitCode,
    /// Messages to print to stdout.
    pub stdout: Vec<String>,
    /// Messages to print to stderr.
    pub stderr: Vec<String>,
}

impl CliOutput {
    fn success(stdout: Vec<String>) -> Self {
        Self { exit_code: ExitCode::SUCCESS, stdout, stderr: vec![] }
    }

    fn error(err: &Error) -> Self {
        Self { exit_code: ExitCode::from(1), stdout: vec![], stderr: vec![format!("Error: {err}")] }
    }

    fn json<T: Serialize>(value: &T) -> Self {
        match serde_json::to_string_pretty(value) {
            Ok(json) => Self::success(vec![json]),
            Err(e) => Self::error(&e.into()),
        }
    }
}

/// Run a CLI command in the current directory's workspace.
pub fn run(command: Command) -> CliOutput {
    match command {
        Command::Version => run_version(),
        Command::Hook(args) => run_hook_cmd(&args),
        Command::Status { json } => run_status_cmd(json),
    }
}

fn run_version() -> CliOutput {
    CliOutput::success(vec![format!("gt-hook v{}", crate::VERSION)])
}

/// The workspace a command runs against.
struct Workspace {
    root: PathBuf,
    config: ProjectConfig,
    runner: RealCommandRunner,
}

impl Workspace {
    fn discover() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let root = paths::find_workspace_root(&cwd)?;
        let config = ProjectConfig::load_from(&root)?;
        let runner = RealCommandRunner::in_dir(&root);
        tracing::debug!(root = %root.display(), bd = config.bd_program(), "using workspace");
        Ok(Self { root, config, runner })
    }

    fn store(&self) -> BdStore<'_> {
        BdStore::new(&self.runner, self.config.bd_program())
    }

    fn identity(&self) -> EnvIdentity {
        EnvIdentity::new(self.config.actor.clone())
    }
}

fn run_hook_cmd(args: &HookArgs) -> CliOutput {
    // Ephemeral workers are turned away before any workspace lookup.
    let class = AgentClass::from_env();
    if let Err(e) = class.ensure_can_hook() {
        return CliOutput::error(&e);
    }

    let workspace = match Workspace::discover() {
        Ok(workspace) => workspace,
        Err(e) => return CliOutput::error(&e),
    };

    let request = args.to_request();
    let store = workspace.store();
    let outcome = run_hook(&request, &class, &workspace.identity(), &store);
    event_log::log_hook_outcome(&workspace.root, &workspace.config, &request.bead_id, &outcome);

    match outcome {
        Ok(report) if args.json => CliOutput::json(&report),
        Ok(report) => CliOutput::success(render_report(&report)),
        Err(e) => CliOutput::error(&e),
    }
}

fn run_status_cmd(json: bool) -> CliOutput {
    let status = Workspace::discover().and_then(|workspace| {
        let store = workspace.store();
        hook_status(&workspace.identity(), &store)
    });
    match status {
        Ok(status) if json => CliOutput::json(&status),
        Ok(status) => CliOutput::success(render_status(&status)),
        Err(e) => CliOutput::error(&e),
    }
}

/// Human-readable lines describing a hook outcome.
#[must_use]
pub fn render_report(report: &HookReport) -> Vec<String> {
    let mut lines = Vec::new();
    match &report.decision {
        Decision::NoOp => lines.push(format!("✓ Already hooked: {}", report.bead_id)),
        Decision::AutoReplace { existing, .. } => {
            lines.push(format!("ℹ Replacing completed bead {}...", existing.id));
        }
        Decision::ForceReplace { existing } => {
            lines.push(format!("⚠ Force-replacing incomplete bead {}...", existing.id));
        }
        Decision::Proceed | Decision::Block { .. } => {}
    }

    if !report.extra_pinned.is_empty() {
        lines.push(format!(
            "⚠ Also pinned to {}: {} (left untouched)",
            report.agent,
            report.extra_pinned.join(", ")
        ));
    }

    if report.decision == Decision::NoOp {
        return lines;
    }

    if report.dry_run {
        for action in &report.actions {
            match action {
                Action::Pin { id, assignee } => {
                    lines.push(format!("🪝 Hooking {id}..."));
                    lines.push(format!(
                        "Would run: bd update {id} --status=pinned --assignee={assignee}"
                    ));
                }
                Action::Close { .. } | Action::Unpin { .. } => lines.push(format!("Would {action}")),
            }
        }
        if let Some(subject) = &report.subject {
            lines.push(format!("  subject (for handoff mail): {subject}"));
        }
        if let Some(message) = &report.message {
            lines.push(format!("  context (for handoff mail): {message}"));
        }
        return lines;
    }

    lines.push(format!("🪝 Hooking {}...", report.bead_id));
    lines.push("✓ Work attached to hook (pinned bead)".to_string());
    lines.push("  Use 'gt handoff' to restart with this work".to_string());
    lines.push("  Use 'gt mol status' to see hook status".to_string());
    lines
}

/// Human-readable lines describing what is on a hook.
#[must_use]
pub fn render_status(status: &HookStatus) -> Vec<String> {
    let Some(bead) = &status.hooked else {
        return vec![format!("Nothing on your hook ({})", status.agent)];
    };

    let mut lines = vec![format!("🪝 {}: {}", bead.id, bead.title)];
    match bead.attachment() {
        Attachment::Molecule(attached) => {
            let molecule = &attached.id;
            match status.completion.and_then(|c| c.progress) {
                Some(progress) => lines.push(format!("  molecule: {molecule} ({progress})")),
                None => lines.push(format!("  molecule: {molecule}")),
            }
            if let Some(attached_at) = &attached.attached_at {
                lines.push(format!("  attached at: {attached_at}"));
            }
            if let Some(args) = &attached.args {
                lines.push(format!("  args: {args}"));
            }
        }
        Attachment::None => lines.push("  no molecule attached".to_string()),
    }

    if status.completion.is_some_and(|c| c.complete) {
        lines.push("  ✓ complete; hooking new work will replace it".to_string());
    } else {
        lines.push("  ⚠ incomplete; use --force to replace it".to_string());
    }

    if !status.extra_pinned.is_empty() {
        lines.push(format!("⚠ Also pinned: {}", status.extra_pinned.join(", ")));
    }
    lines
}
