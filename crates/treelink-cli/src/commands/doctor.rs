//! Doctor command implementation

use colored::Colorize;
use treelink_core::{HealthReport, diagnose};

use super::Invocation;
use crate::error::{CliError, Result};

/// Run the doctor command
///
/// A configuration that fails to load is reported, not returned as an error,
/// so the remaining checks still run.
pub fn run_doctor(invocation: &Invocation, json: bool) -> Result<()> {
    let ctx = invocation.context()?;
    let config = invocation.load(&ctx);
    let report = diagnose(ctx, config);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render(&report);
    }

    if report.is_healthy() {
        Ok(())
    } else {
        Err(CliError::user("health check found problems"))
    }
}

fn check(ok: bool, label: &str) {
    if ok {
        println!("   {} {}", "OK".green().bold(), label);
    } else {
        println!("   {} {}", "FAIL".red().bold(), label);
    }
}

fn render(report: &HealthReport) {
    println!("{} Checking treelink health...", "=>".blue().bold());
    check(report.config_valid, "configuration is valid");
    check(report.source_reachable, "source worktree is reachable");
    check(
        report.unreachable_targets.is_empty(),
        "all target worktrees are reachable",
    );
    check(
        report.missing_sources.is_empty(),
        "shared files exist in the source worktree",
    );
    check(report.broken_links.is_empty(), "no broken links");
    check(report.permission_errors.is_empty(), "no permission errors");

    if let Some(error) = &report.config_error {
        println!("   {} {}", "!".red(), error);
    }
    for tree in &report.unreachable_targets {
        println!("   {} {} ({})", "!".red(), tree.tree, tree.path.display());
    }
    for link in &report.broken_links {
        println!("   {} {}/{}", "!".red(), link.tree.cyan(), link.file);
    }
    for issue in &report.permission_errors {
        println!("   {} {}: {}", "!".red(), issue.path.display(), issue.message);
    }

    if !report.remediation.is_empty() {
        println!();
        println!("{}", "Suggested fixes:".bold());
        for line in &report.remediation {
            println!("   {} {}", "-".yellow(), line);
        }
    }
}
