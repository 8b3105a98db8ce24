//! Read-only status, health checks, and broken-link cleanup
//!
//! All three reuse the link inspection from `treelink-fs`, so status and
//! sync always agree on what a given entry is.

mod cleanup;
mod doctor;
mod links;

pub use cleanup::{CleanedLink, CleanupReport, cleanup};
pub use doctor::{BrokenLink, HealthReport, PermissionIssue, UnreachableTree, diagnose};
pub use links::{LinkStatus, link_status};
