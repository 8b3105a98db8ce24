//! Discovery of symbolic links already present in a tree
//!
//! Uses an explicit stack rather than recursion so pathological nesting
//! cannot exhaust the call stack.

use std::fs;
use std::path::Path;

use crate::constants::is_skipped_dir;
use crate::path::NormalizedPath;

/// Find every symbolic link under `root`, relative to `root`, sorted.
///
/// Directories named in the skip list are not entered, links are never
/// followed, and unreadable directories are skipped with a debug log.
pub fn find_symlinks(root: &Path) -> Vec<NormalizedPath> {
    let mut found = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!(dir = %dir.display(), error = %e, "skipping unreadable directory");
                continue;
            }
        };

        for entry in entries.flatten() {
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            let path = entry.path();

            if file_type.is_symlink() {
                if let Ok(rel) = path.strip_prefix(root) {
                    found.push(NormalizedPath::new(rel));
                }
            } else if file_type.is_dir() {
                let name = entry.file_name();
                if !is_skipped_dir(&name.to_string_lossy()) {
                    stack.push(path);
                }
            }
        }
    }

    found.sort();
    found
}
