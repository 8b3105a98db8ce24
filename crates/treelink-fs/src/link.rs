//! Link state inspection
//!
//! Every function here is total: filesystem failures (permission denied,
//! link cycles, stale handles, exhausted descriptors) are folded into the
//! answer instead of being returned, so callers reason only in terms of
//! the four observable states.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::path::lexical_normalize;

/// What currently occupies a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkState {
    /// Nothing exists, not even a dangling link.
    Absent,
    /// A symbolic link whose destination exists.
    ValidLink,
    /// A symbolic link whose destination does not resolve.
    BrokenLink,
    /// A regular file, directory, or other non-link entry.
    Plain,
}

impl LinkState {
    pub fn is_link(self) -> bool {
        matches!(self, Self::ValidLink | Self::BrokenLink)
    }
}

/// Classify the entry at `path`.
///
/// An entry that cannot be stat'ed for any reason is reported as `Absent`.
pub fn inspect(path: &Path) -> LinkState {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => {
            if fs::metadata(path).is_ok() {
                LinkState::ValidLink
            } else {
                LinkState::BrokenLink
            }
        }
        Ok(_) => LinkState::Plain,
        Err(_) => LinkState::Absent,
    }
}

/// True only if `path` is a symbolic link whose destination exists.
pub fn is_valid_link(path: &Path) -> bool {
    inspect(path) == LinkState::ValidLink
}

/// Absolute destination of the link at `path`, resolved against the link's
/// parent directory but without following further links.
///
/// Returns `None` when `path` is not a readable symbolic link.
pub fn link_destination(path: &Path) -> Option<PathBuf> {
    let meta = fs::symlink_metadata(path).ok()?;
    if !meta.file_type().is_symlink() {
        return None;
    }
    let raw = fs::read_link(path).ok()?;
    let joined = if raw.is_absolute() {
        raw
    } else {
        path.parent().unwrap_or_else(|| Path::new("")).join(raw)
    };
    Some(lexical_normalize(&joined))
}

/// True only if `path` is a symbolic link resolving to the same place as `expected`.
///
/// Comparison is by resolved absolute path, so a relative link and an
/// absolute link to the same file compare equal. When either side cannot be
/// canonicalized the lexically normalized forms are compared instead.
pub fn points_to(path: &Path, expected: &Path) -> bool {
    let Some(destination) = link_destination(path) else {
        return false;
    };

    match (
        dunce::canonicalize(&destination),
        dunce::canonicalize(expected),
    ) {
        (Ok(actual), Ok(wanted)) => actual == wanted,
        _ => destination == lexical_normalize(&absolute(expected)),
    }
}

/// True when the nearest existing ancestor of `path` resolves under `root`.
///
/// A directory link inside a tree can lead anywhere, so a path that is
/// lexically under `root` may still land somewhere else on disk. An ancestor
/// that cannot be resolved counts as outside. When `root` itself cannot be
/// resolved the answer is `true` and reachability is left to the caller.
pub fn resolves_within(path: &Path, root: &Path) -> bool {
    let Ok(root) = dunce::canonicalize(root) else {
        return true;
    };
    let Some(parent) = path.parent() else {
        return false;
    };
    parent
        .ancestors()
        .find(|ancestor| fs::symlink_metadata(ancestor).is_ok())
        .and_then(|ancestor| dunce::canonicalize(ancestor).ok())
        .is_some_and(|resolved| resolved.starts_with(&root))
}

/// True when both paths exist and resolve to the same entry.
pub fn same_entry(a: &Path, b: &Path) -> bool {
    match (dunce::canonicalize(a), dunce::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}
