//! Git collaborator for treelink
//!
//! Resolves the repository root of the current working tree and lists every
//! linked working tree of the repository. Nothing here mutates git state.

pub mod error;
pub mod root;
pub mod worktree;

pub use error::{Error, Result};
pub use root::discover_root;
pub use worktree::{WorktreeInfo, list_worktrees, parse_porcelain};
