//! treelink CLI
//!
//! Keeps a set of shared files from one git worktree linked into every
//! other worktree of the same repository.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use commands::Invocation;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let start = match cli.directory {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let invocation = Invocation::new(start, cli.config);

    match cli.command {
        Some(cmd) => execute_command(&invocation, cmd),
        None => {
            println!(
                "{} Shared files across git worktrees",
                "treelink".green().bold()
            );
            println!();
            println!("Run {} for available commands.", "treelink --help".cyan());
            Ok(())
        }
    }
}

/// `RUST_LOG` wins; otherwise `--verbose` selects debug and the default is warn.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .try_init();
    tracing::debug!("Verbose mode enabled");
}

fn execute_command(invocation: &Invocation, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Sync {
            dry_run,
            json,
            targets,
        } => commands::run_sync(invocation, dry_run, json, targets),
        Commands::Status { json } => commands::run_status(invocation, json),
        Commands::Doctor { json } => commands::run_doctor(invocation, json),
        Commands::Cleanup { dry_run } => commands::run_cleanup(invocation, dry_run),
        Commands::List { json } => commands::run_list(invocation, json),
        Commands::Init { force } => commands::run_init(invocation, force),
    }
}
