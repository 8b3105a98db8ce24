//! [`TestTrees`] builder: one source tree and any number of target trees
//! laid out as siblings inside a temporary directory.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary directory holding `main/` (the source tree) and sibling
/// target trees.
///
/// # Example
///
/// ```rust,no_run
/// use treelink_test_utils::TestTrees;
///
/// let trees = TestTrees::new(&["feature-a", "feature-b"]);
/// trees.write_source(".env", "X=1");
/// assert!(trees.target("feature-a").is_dir());
/// ```
pub struct TestTrees {
    temp_dir: TempDir,
    source: PathBuf,
    targets: Vec<(String, PathBuf)>,
}

impl TestTrees {
    /// Create `main/` plus one directory per target name.
    pub fn new(targets: &[&str]) -> Self {
        let temp_dir = TempDir::new().unwrap();
        // Canonical paths keep link comparisons stable where the temp dir
        // itself sits behind a symlink.
        let base = temp_dir.path().canonicalize().unwrap();
        let source = base.join("main");
        fs::create_dir_all(&source).unwrap();

        let targets = targets
            .iter()
            .map(|name| {
                let path = base.join(name);
                fs::create_dir_all(&path).unwrap();
                (name.to_string(), path)
            })
            .collect();

        Self {
            temp_dir,
            source,
            targets,
        }
    }

    /// Root of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of the source tree.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Path of the named target tree.
    ///
    /// # Panics
    /// Panics if no target with that name was created.
    pub fn target(&self, name: &str) -> &Path {
        self.targets
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p.as_path())
            .unwrap_or_else(|| panic!("no target tree named {name}"))
    }

    /// Names and paths of all target trees, in creation order.
    pub fn targets(&self) -> &[(String, PathBuf)] {
        &self.targets
    }

    /// Write `content` to `rel` inside the source tree, creating parents.
    pub fn write_source(&self, rel: &str, content: &str) -> PathBuf {
        write_under(&self.source, rel, content)
    }

    /// Write `content` to `rel` inside the named target tree, creating parents.
    pub fn write_target(&self, target: &str, rel: &str, content: &str) -> PathBuf {
        write_under(self.target(target), rel, content)
    }

    /// Read `rel` from the named target tree, following links.
    pub fn read_target(&self, target: &str, rel: &str) -> String {
        fs::read_to_string(self.target(target).join(rel)).unwrap_or_else(|e| {
            panic!("failed to read {rel} in {target}: {e}")
        })
    }

    /// Assert that `rel` in the named target tree is a symbolic link.
    ///
    /// # Panics
    /// Panics with a descriptive message otherwise.
    pub fn assert_is_link(&self, target: &str, rel: &str) {
        let path = self.target(target).join(rel);
        let meta = fs::symlink_metadata(&path)
            .unwrap_or_else(|e| panic!("expected link at {}: {e}", path.display()));
        assert!(
            meta.file_type().is_symlink(),
            "expected {} to be a symlink",
            path.display()
        );
    }
}

fn write_under(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}
