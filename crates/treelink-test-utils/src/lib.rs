//! Shared test utilities for the treelink workspace.
//!
//! This crate provides standardised fixtures so each crate's test suite does
//! not rebuild the same temporary trees by hand. It is a dev-dependency only.
//!
//! # Modules
//!
//! - [`git`]: real git repositories with linked worktrees
//! - [`trees`]: [`TestTrees`] builder for a source tree plus target trees
//! - `perms` (unix): [`LockedDir`] guard for permission-denied cases

pub mod git;
#[cfg(unix)]
pub mod perms;
pub mod trees;

#[cfg(unix)]
pub use perms::LockedDir;
pub use trees::TestTrees;
