//! Status command implementation

use colored::Colorize;
use treelink_core::{LinkStatus, link_status};

use super::Invocation;
use crate::error::Result;

/// Run the status command
///
/// Status is informational; problems are shown but do not fail the command.
pub fn run_status(invocation: &Invocation, json: bool) -> Result<()> {
    let engine = invocation.engine()?;
    let source = engine.source()?;
    let targets = engine.targets(&[])?;
    let files = engine.files()?;
    let statuses = link_status(source, &targets, &files);

    if json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
        return Ok(());
    }

    println!(
        "{} Source: {} ({})",
        "=>".blue().bold(),
        source.name.cyan(),
        source.path.display()
    );
    if statuses.is_empty() {
        println!("   No other worktrees found.");
    }
    for status in &statuses {
        println!();
        render_tree(status);
    }
    Ok(())
}

fn render_tree(status: &LinkStatus) {
    println!("{} ({})", status.tree.bold(), status.path.display().to_string().dimmed());
    if !status.reachable {
        println!("   {} worktree directory is not reachable", "UNREACHABLE".red().bold());
        return;
    }
    if status.is_clean() {
        println!(
            "   {} {} link(s) valid",
            "OK".green().bold(),
            status.valid.len()
        );
        return;
    }
    for file in &status.valid {
        println!("   {} {}", "OK".green(), file);
    }
    for file in &status.missing {
        println!("   {} {}", "MISSING".yellow().bold(), file);
    }
    for file in &status.broken {
        println!("   {} {}", "BROKEN".red().bold(), file);
    }
    for file in &status.conflicting {
        println!("   {} {}", "CONFLICT".magenta().bold(), file);
    }
}
