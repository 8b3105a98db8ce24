//! List command implementation

use colored::Colorize;

use super::Invocation;
use crate::error::Result;

/// Run the list command
///
/// The source is taken from the configuration when it loads, otherwise the
/// primary worktree is marked.
pub fn run_list(invocation: &Invocation, json: bool) -> Result<()> {
    let mut ctx = invocation.context()?;
    let selector = invocation.load(&ctx).ok().and_then(|c| c.source_worktree);
    if let Err(e) = ctx.select_source(selector.as_deref()) {
        tracing::warn!(error = %e, "no source worktree selected");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(ctx.trees())?);
        return Ok(());
    }

    println!("{}", "Worktrees".bold());
    for tree in ctx.trees() {
        let marker = if tree.is_source {
            "*".green().bold()
        } else {
            " ".normal()
        };
        let revision = tree
            .revision
            .as_deref()
            .map(|r| &r[..r.len().min(8)])
            .unwrap_or("-");
        println!(
            "  {} {:<20} {} {}",
            marker,
            tree.name.green(),
            revision.dimmed(),
            tree.path.display()
        );
    }
    Ok(())
}
