//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// treelink - Keep shared files linked across git worktrees
#[derive(Parser, Debug)]
#[command(name = "treelink")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run as if started in this directory
    #[arg(short = 'C', long, global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Path to treelink.json (defaults to the repository root)
    #[arg(long, global = true, value_name = "PATH", env = "TREELINK_CONFIG")]
    pub config: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Link shared files from the source worktree into every other worktree
    Sync {
        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,

        /// Only sync these worktrees (by name or branch); repeatable
        #[arg(short, long = "target", value_name = "NAME")]
        targets: Vec<String>,
    },

    /// Show link status for each target worktree
    Status {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Check configuration, worktrees, and links for problems
    Doctor {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Remove broken links left behind by earlier syncs
    Cleanup {
        /// Preview removals without applying them
        #[arg(long)]
        dry_run: bool,
    },

    /// List discovered worktrees
    List {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Write a starter treelink.json at the repository root
    Init {
        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },
}
