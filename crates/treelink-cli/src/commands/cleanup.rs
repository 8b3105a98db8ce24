//! Cleanup command implementation

use colored::Colorize;
use treelink_core::cleanup;

use super::Invocation;
use crate::error::{CliError, Result};

/// Run the cleanup command
pub fn run_cleanup(invocation: &Invocation, dry_run: bool) -> Result<()> {
    let engine = invocation.engine()?;
    let source = engine.source()?;
    let targets = engine.targets(&[])?;
    let files = engine.files()?;

    println!("{} Removing broken links...", "=>".blue().bold());
    let report = cleanup(source, &targets, &files, dry_run);

    if report.removed.is_empty() && report.errors.is_empty() {
        println!("{} No broken links found.", "OK".green().bold());
        return Ok(());
    }

    let verb = if dry_run { "Would remove" } else { "Removed" };
    for link in &report.removed {
        println!("   {} {} {}/{}", "-".red(), verb, link.tree.cyan(), link.file);
    }
    for error in &report.errors {
        println!(
            "   {} {}/{}: {}",
            "!".red(),
            error.tree.cyan(),
            error.file,
            error.message
        );
    }

    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::user(format!(
            "{} link(s) could not be removed",
            report.errors.len()
        )))
    }
}
