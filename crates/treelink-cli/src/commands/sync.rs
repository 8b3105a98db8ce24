//! Sync command implementation

use colored::Colorize;
use treelink_core::{ActionKind, SyncAction, SyncOptions, SyncOutcome};

use super::Invocation;
use crate::error::{CliError, Result};

/// Run the sync command
///
/// Exits non-zero when any action failed, after reporting every failure.
pub fn run_sync(
    invocation: &Invocation,
    dry_run: bool,
    json: bool,
    targets: Vec<String>,
) -> Result<()> {
    let mut engine = invocation.engine()?;

    if !json {
        let verb = if dry_run {
            "Previewing sync (dry run)"
        } else {
            "Synchronizing shared files"
        };
        println!("{} {}...", "=>".blue().bold(), verb);
    }

    let outcome = match engine.run(&SyncOptions { dry_run, targets }) {
        Ok(outcome) => outcome,
        Err(e) => {
            if let Some(applied) = engine.applied()
                && !json
            {
                println!(
                    "{} Links were changed before the failure: {} created, {} updated, {} failed",
                    "WARN".yellow().bold(),
                    applied.created,
                    applied.updated,
                    applied.errors.len()
                );
            }
            return Err(e.into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        render(&outcome);
    }

    if outcome.is_success() {
        Ok(())
    } else {
        Err(CliError::user(format!(
            "{} action(s) failed",
            outcome.result.errors.len()
        )))
    }
}

fn render(outcome: &SyncOutcome) {
    for warning in &outcome.warnings {
        println!("{} {}", "warning:".yellow().bold(), warning);
    }

    let changes: Vec<&SyncAction> = outcome
        .plan
        .actions
        .iter()
        .filter(|a| a.kind != ActionKind::Skip)
        .collect();

    let result = &outcome.result;
    if changes.is_empty() && result.errors.is_empty() {
        println!(
            "{} Already synchronized. No changes needed.",
            "OK".green().bold()
        );
        return;
    }

    let heading = if outcome.dry_run {
        "Would apply:"
    } else {
        "Applied:"
    };
    println!("{} {}", "OK".green().bold(), heading);
    for action in changes {
        let marker = match action.kind {
            ActionKind::Create => "+".green(),
            ActionKind::Update => "~".yellow(),
            ActionKind::Skip => "-".dimmed(),
        };
        println!(
            "   {} {}/{} ({})",
            marker,
            action.tree.cyan(),
            action.relative_file,
            action.reason.to_string().dimmed()
        );
    }
    println!(
        "   {} created, {} updated, {} skipped",
        result.created, result.updated, result.skipped
    );

    if !result.errors.is_empty() {
        println!();
        println!("{} Some actions failed:", "ERROR".red().bold());
        for error in &result.errors {
            println!(
                "   {} {}/{}: {}",
                "!".red(),
                error.tree.cyan(),
                error.file,
                error.message
            );
        }
    }
}
