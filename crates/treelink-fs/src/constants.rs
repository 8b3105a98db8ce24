//! Reserved names shared across the workspace.

/// Configuration file that drives a sync.
///
/// Always linked into every target tree, whatever the pattern list says.
pub const CONFIG_FILE_NAME: &str = "treelink.json";

/// Directory names never descended into when looking for existing links.
pub const SKIP_DIR_NAMES: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "target",
    "dist",
    "build",
    ".venv",
    "__pycache__",
    ".cache",
    ".next",
    ".turbo",
];

/// Whether a directory entry with this name should be skipped during traversal.
pub fn is_skipped_dir(name: &str) -> bool {
    SKIP_DIR_NAMES.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_list_covers_vcs_and_build_output() {
        assert!(is_skipped_dir(".git"));
        assert!(is_skipped_dir("node_modules"));
        assert!(is_skipped_dir("target"));
        assert!(!is_skipped_dir(".vscode"));
        assert!(!is_skipped_dir("src"));
    }
}
