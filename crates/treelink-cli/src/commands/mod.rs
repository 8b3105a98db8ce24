//! Command implementations for treelink-cli

pub mod cleanup;
pub mod doctor;
pub mod init;
pub mod list;
pub mod status;
pub mod sync;

use std::path::{Path, PathBuf};

use treelink_core::{RunContext, SyncConfig, SyncEngine, config_path, load_config};

use crate::error::Result;

pub use cleanup::run_cleanup;
pub use doctor::run_doctor;
pub use init::run_init;
pub use list::run_list;
pub use status::run_status;
pub use sync::run_sync;

/// Where the command was started and which configuration it was pointed at.
#[derive(Debug, Clone)]
pub struct Invocation {
    start: PathBuf,
    config: Option<PathBuf>,
}

impl Invocation {
    pub fn new(start: PathBuf, config: Option<PathBuf>) -> Self {
        Self { start, config }
    }

    pub fn config_override(&self) -> Option<&Path> {
        self.config.as_deref()
    }

    /// Discover the repository and its worktrees.
    pub fn context(&self) -> Result<RunContext> {
        Ok(RunContext::discover(&self.start)?)
    }

    /// Configuration file to use for `ctx`.
    ///
    /// An explicit `--config` wins. Otherwise the current worktree's root is
    /// tried first, then the primary worktree's.
    pub fn config_path(&self, ctx: &RunContext) -> PathBuf {
        if let Some(path) = &self.config {
            return path.clone();
        }
        let local = config_path(ctx.root());
        if local.is_file() {
            return local;
        }
        ctx.trees()
            .iter()
            .find(|t| t.is_primary)
            .map(|t| config_path(&t.path))
            .filter(|p| p.is_file())
            .unwrap_or(local)
    }

    pub fn load(&self, ctx: &RunContext) -> treelink_core::Result<SyncConfig> {
        let path = self.config_path(ctx);
        tracing::debug!(path = %path.display(), "using configuration");
        load_config(&path)
    }

    /// Context, configuration, and engine in one step.
    pub fn engine(&self) -> Result<SyncEngine> {
        let ctx = self.context()?;
        let config = self.load(&ctx)?;
        Ok(SyncEngine::new(ctx, config)?)
    }
}
