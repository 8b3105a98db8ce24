//! Init command implementation

use colored::Colorize;
use treelink_core::{SyncConfig, config_path};
use treelink_fs::io::write_atomic;

use super::Invocation;
use crate::error::{CliError, Result};

/// Run the init command
///
/// Writes the starter configuration at the current worktree's root, or at
/// `--config` when given.
pub fn run_init(invocation: &Invocation, force: bool) -> Result<()> {
    let ctx = invocation.context()?;
    let path = invocation
        .config_override()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| config_path(ctx.root()));

    if path.exists() && !force {
        return Err(CliError::user(format!(
            "{} already exists; use --force to overwrite",
            path.display()
        )));
    }

    let mut content = serde_json::to_string_pretty(&SyncConfig::default_document())?;
    content.push('\n');
    write_atomic(&path, content.as_bytes())?;

    println!(
        "{} Wrote {}",
        "OK".green().bold(),
        path.display().to_string().cyan()
    );
    println!("Edit {} then run {}.", "sharedFiles".cyan(), "treelink sync".cyan());
    Ok(())
}
