//! Path handling: forward-slash relative keys and link-text arithmetic

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A path normalized to use forward slashes internally.
///
/// Used as the key for a shared file relative to a tree root, so the same
/// file compares equal regardless of the platform that produced it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    ///
    /// Converts backslashes to forward slashes and drops a leading `./`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy();
        let normalized = path_str.replace('\\', "/");
        let normalized = normalized.strip_prefix("./").unwrap_or(&normalized);
        Self {
            inner: normalized.to_string(),
        }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        self.inner.split('/').filter(|s| !s.is_empty()).collect()
    }

    /// Resolve this relative path under `root`.
    pub fn under(&self, root: &Path) -> PathBuf {
        root.join(self.to_native())
    }

    /// Whether every component is a plain name, so joining it to a root
    /// cannot leave that root. The empty path is not contained.
    pub fn is_contained(&self) -> bool {
        let path = Path::new(&self.inner);
        path.components().next().is_some()
            && path.components().all(|c| matches!(c, Component::Normal(_)))
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}

/// Resolve `.` and `..` components without touching the filesystem.
///
/// `..` at the root is dropped, matching what the kernel does.
pub fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)));
                if popped {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Compute the text of a relative link placed in `link_dir` that reaches `target`.
///
/// Both inputs should be absolute. When they share no common prefix (for
/// instance different drive letters) the absolute `target` is returned.
pub fn relative_link_text(link_dir: &Path, target: &Path) -> PathBuf {
    let from = lexical_normalize(link_dir);
    let to = lexical_normalize(target);

    let from_parts: Vec<Component<'_>> = from.components().collect();
    let to_parts: Vec<Component<'_>> = to.components().collect();

    let common = from_parts
        .iter()
        .zip(to_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    if common == 0 {
        return to.clone();
    }

    let mut text = PathBuf::new();
    for _ in common..from_parts.len() {
        text.push("..");
    }
    for part in &to_parts[common..] {
        text.push(part.as_os_str());
    }
    if text.as_os_str().is_empty() {
        text.push(".");
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_path_strips_dot_slash_and_backslashes() {
        assert_eq!(NormalizedPath::new("./a/b.txt").as_str(), "a/b.txt");
        assert_eq!(NormalizedPath::new("a\\b\\c.env").as_str(), "a/b/c.env");
    }

    #[test]
    fn test_normalized_path_ordering_is_lexicographic() {
        let mut paths = vec![
            NormalizedPath::new("b.txt"),
            NormalizedPath::new(".env"),
            NormalizedPath::new("a/z.txt"),
        ];
        paths.sort();
        let as_str: Vec<&str> = paths.iter().map(|p| p.as_str()).collect();
        assert_eq!(as_str, vec![".env", "a/z.txt", "b.txt"]);
    }

    #[test]
    fn test_contained_paths() {
        assert!(NormalizedPath::new(".vscode/settings.json").is_contained());
        assert!(NormalizedPath::new("./a/b.txt").is_contained());
        assert!(!NormalizedPath::new("../feature/secret.txt").is_contained());
        assert!(!NormalizedPath::new("a/../../b").is_contained());
        assert!(!NormalizedPath::new("/etc/passwd").is_contained());
        assert!(!NormalizedPath::new("").is_contained());
    }

    #[test]
    fn test_lexical_normalize() {
        assert_eq!(
            lexical_normalize(Path::new("/a/b/../c/./d")),
            PathBuf::from("/a/c/d")
        );
        assert_eq!(lexical_normalize(Path::new("/..")), PathBuf::from("/"));
        assert_eq!(lexical_normalize(Path::new("../x")), PathBuf::from("../x"));
    }

    #[cfg(unix)]
    #[test]
    fn test_relative_link_text_sibling_trees() {
        let text = relative_link_text(
            Path::new("/work/feature"),
            Path::new("/work/main/docker-compose.yml"),
        );
        assert_eq!(text, PathBuf::from("../main/docker-compose.yml"));
    }

    #[cfg(unix)]
    #[test]
    fn test_relative_link_text_nested_file() {
        let text = relative_link_text(
            Path::new("/work/feature/.vscode"),
            Path::new("/work/main/.vscode/settings.json"),
        );
        assert_eq!(text, PathBuf::from("../../main/.vscode/settings.json"));
    }

    #[cfg(unix)]
    #[test]
    fn test_relative_link_text_resolves_back_to_target() {
        let dir = Path::new("/r/wt/a/b");
        let target = Path::new("/r/main/a/b/c.txt");
        let text = relative_link_text(dir, target);
        assert_eq!(lexical_normalize(&dir.join(&text)), target);
    }
}
