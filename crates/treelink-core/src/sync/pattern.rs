//! Pattern resolution: inclusion/exclusion globs to a sorted file list

use std::collections::BTreeSet;
use std::path::Path;

use glob::{MatchOptions, Pattern};
use treelink_fs::{CONFIG_FILE_NAME, NormalizedPath};

use crate::{Error, Result};

/// Glob options shared by inclusion and exclusion matching.
///
/// `*` never crosses a path separator and leading dots need no literal
/// match, so `*.env` selects `.env` and `**/` spans directories.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Expand `include` against `source_root`, drop anything matching `exclude`,
/// and return the sorted, deduplicated relative file paths.
///
/// Only file leaves inside the source tree are returned; a match reached
/// through `..` is dropped. A pattern that matches nothing is fine; a
/// malformed pattern is an error. The configuration file is always included
/// when it exists in the source tree.
pub fn resolve_patterns(
    source_root: &Path,
    include: &[String],
    exclude: &[String],
) -> Result<Vec<NormalizedPath>> {
    let excludes = compile(exclude)?;
    let escaped_root = Pattern::escape(&source_root.to_string_lossy());

    let mut files = BTreeSet::new();
    for pattern in include {
        compile_one(pattern)?;
        let full = format!("{}/{}", escaped_root, pattern.trim_start_matches("./"));
        let entries = glob::glob_with(&full, MATCH_OPTIONS).map_err(|e| Error::Pattern {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;

        let mut matched = 0usize;
        for entry in entries {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    tracing::warn!(pattern = %pattern, error = %e, "skipping unreadable glob entry");
                    continue;
                }
            };
            if !path.is_file() {
                continue;
            }
            let Ok(rel) = path.strip_prefix(source_root) else {
                continue;
            };
            let rel = NormalizedPath::new(rel);
            if !rel.is_contained() {
                tracing::warn!(pattern = %pattern, file = %rel, "dropping match outside the source tree");
                continue;
            }
            files.insert(rel);
            matched += 1;
        }
        tracing::debug!(pattern = %pattern, matched, "expanded pattern");
    }

    files.retain(|file| !is_excluded(file, &excludes));

    if source_root.join(CONFIG_FILE_NAME).is_file() {
        files.insert(NormalizedPath::new(CONFIG_FILE_NAME));
    }

    Ok(files.into_iter().collect())
}

/// Whether `file` matches any of the compiled exclusion patterns.
pub fn is_excluded(file: &NormalizedPath, excludes: &[Pattern]) -> bool {
    excludes
        .iter()
        .any(|p| p.matches_with(file.as_str(), MATCH_OPTIONS))
}

/// Compile a list of glob patterns, failing on the first malformed one.
pub fn compile(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns.iter().map(|p| compile_one(p)).collect()
}

fn compile_one(pattern: &str) -> Result<Pattern> {
    Pattern::new(pattern.trim_start_matches("./")).map_err(|e| Error::Pattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}
