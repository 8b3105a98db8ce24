//! Reconciliation engine for treelink
//!
//! Keeps a set of shared files from one working tree (the source) linked
//! into every other working tree of the same repository:
//!
//! - **Configuration**: `treelink.json`, validated once at the boundary
//! - **Run context**: repository root plus discovered working trees
//! - **Sync**: pattern resolution, planning, reconciliation, and the engine
//!   that sequences them with optional hooks
//! - **Status**: per-tree link status, the composed health check, and
//!   cleanup of broken links
//!
//! # Architecture
//!
//! ```text
//!                 treelink-cli
//!                      |
//!                treelink-core
//!                   /     \
//!          treelink-fs   treelink-git
//! ```
//!
//! # Example
//!
//! ```ignore
//! use treelink_core::{RunContext, SyncEngine, SyncOptions, load_config, config_path};
//!
//! let ctx = RunContext::discover(&std::env::current_dir()?)?;
//! let config = load_config(&config_path(ctx.root()))?;
//! let mut engine = SyncEngine::new(ctx, config)?;
//! let outcome = engine.run(&SyncOptions::default())?;
//! println!("created {}", outcome.result.created);
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod hooks;
pub mod status;
pub mod sync;

pub use config::{HooksConfig, LinkMode, SyncConfig, config_path, load_config, parse_config};
pub use context::{RunContext, WorkingTree};
pub use error::{Error, Result};
pub use hooks::{HookContext, HookEvent, HookResult, run_hook};
pub use status::{
    BrokenLink, CleanedLink, CleanupReport, HealthReport, LinkStatus, PermissionIssue,
    UnreachableTree, cleanup, diagnose, link_status,
};
pub use sync::{
    ActionError, ActionKind, ActionReason, EngineState, Plan, PlanOptions, SyncAction,
    SyncEngine, SyncOptions, SyncOutcome, SyncResult, resolve_patterns,
};
