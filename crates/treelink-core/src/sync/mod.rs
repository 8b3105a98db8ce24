//! Synchronisation of shared files into target trees
//!
//! - **pattern**: inclusion/exclusion globs to a sorted file list
//! - **plan**: classify each (tree, file) pair as create, update, or skip
//! - **reconcile**: apply one action to disk
//! - **engine**: sequence a whole run, hooks included
//! - **report**: counts and per-action errors

mod engine;
mod pattern;
mod plan;
mod reconcile;
mod report;

pub use engine::{EngineState, SyncEngine, SyncOptions, SyncOutcome};
pub use pattern::{compile, is_excluded, resolve_patterns};
pub use plan::{ActionKind, ActionReason, Plan, PlanOptions, SyncAction, link_text_for, plan};
pub use reconcile::apply;
pub use report::{ActionError, SyncResult};
