//! Configuration schema with documented defaults

use std::fmt;
use std::path::{Component, Path};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// How link text is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkMode {
    /// Path from the link's directory to the source file.
    #[default]
    Relative,
    /// Fully resolved source path.
    Absolute,
}

impl fmt::Display for LinkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Relative => write!(f, "relative"),
            Self::Absolute => write!(f, "absolute"),
        }
    }
}

impl FromStr for LinkMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "relative" => Ok(Self::Relative),
            "absolute" => Ok(Self::Absolute),
            other => Err(Error::config(format!(
                "linkMode must be \"relative\" or \"absolute\", got \"{other}\""
            ))),
        }
    }
}

/// Shell commands run around a sync. Opaque strings handed to the shell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HooksConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_sync: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_sync: Option<String>,
}

/// Contents of `treelink.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    /// Optional schema tag; carried through but never interpreted.
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Glob patterns selecting files to share, relative to the source tree.
    pub shared_files: Vec<String>,

    /// Glob patterns removed from the selection.
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Source tree by name, branch, or path. `None` means the primary tree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_worktree: Option<String>,

    #[serde(default)]
    pub link_mode: LinkMode,

    /// Replace plain files and empty directories found at link locations.
    #[serde(default)]
    pub overwrite_existing: bool,

    #[serde(default)]
    pub hooks: HooksConfig,
}

impl SyncConfig {
    /// A configuration sharing the given patterns, everything else defaulted.
    pub fn with_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            schema: None,
            shared_files: patterns.into_iter().map(Into::into).collect(),
            ignore_patterns: Vec::new(),
            source_worktree: None,
            link_mode: LinkMode::default(),
            overwrite_existing: false,
            hooks: HooksConfig::default(),
        }
    }

    /// Check the structural rules serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.shared_files.is_empty() {
            return Err(Error::config("sharedFiles must contain at least one pattern"));
        }

        for (field, patterns) in [
            ("sharedFiles", &self.shared_files),
            ("ignorePatterns", &self.ignore_patterns),
        ] {
            for pattern in patterns {
                if pattern.trim().is_empty() {
                    return Err(Error::config(format!("{field} contains an empty pattern")));
                }
                if !stays_in_tree(pattern) {
                    return Err(Error::config(format!(
                        "{field} pattern '{pattern}' must be relative to the tree root and must not contain '..'"
                    )));
                }
                glob::Pattern::new(pattern).map_err(|e| Error::Pattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
            }
        }

        if let Some(selector) = &self.source_worktree
            && selector.trim().is_empty()
        {
            return Err(Error::config("sourceWorktree must not be empty when set"));
        }

        for (name, hook) in [
            ("beforeSync", &self.hooks.before_sync),
            ("afterSync", &self.hooks.after_sync),
        ] {
            if let Some(cmd) = hook
                && cmd.trim().is_empty()
            {
                return Err(Error::config(format!("hooks.{name} must not be empty when set")));
            }
        }

        Ok(())
    }

    /// Starter document written by `treelink init`.
    pub fn default_document() -> Self {
        Self::with_patterns([".env", "docker-compose.yml", ".vscode/settings.json"])
    }
}

/// Patterns are joined to a tree root, so they may only name things below it.
fn stays_in_tree(pattern: &str) -> bool {
    Path::new(pattern)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_defaults_applied() {
        let config: SyncConfig = serde_json::from_str(r#"{"sharedFiles": [".env"]}"#).unwrap();
        assert_eq!(config.link_mode, LinkMode::Relative);
        assert!(!config.overwrite_existing);
        assert!(config.ignore_patterns.is_empty());
        assert_eq!(config.source_worktree, None);
        assert_eq!(config.hooks, HooksConfig::default());
        config.validate().unwrap();
    }

    #[test]
    fn test_full_document() {
        let json = r#"{
            "$schema": "https://example.invalid/treelink.schema.json",
            "sharedFiles": ["docker-compose.yml", "**/*.env"],
            "ignorePatterns": ["secrets/**"],
            "sourceWorktree": "main",
            "linkMode": "absolute",
            "overwriteExisting": true,
            "hooks": { "beforeSync": "echo before", "afterSync": "echo after" }
        }"#;
        let config: SyncConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.link_mode, LinkMode::Absolute);
        assert!(config.overwrite_existing);
        assert_eq!(config.hooks.before_sync.as_deref(), Some("echo before"));
        assert_eq!(config.source_worktree.as_deref(), Some("main"));
        config.validate().unwrap();
    }

    #[rstest]
    #[case::empty_pattern_list(r#"{"sharedFiles": []}"#, "at least one pattern")]
    #[case::blank_pattern(r#"{"sharedFiles": [" "]}"#, "sharedFiles contains an empty pattern")]
    #[case::blank_ignore(
        r#"{"sharedFiles": [".env"], "ignorePatterns": [""]}"#,
        "ignorePatterns contains an empty pattern"
    )]
    #[case::parent_dir(r#"{"sharedFiles": ["../feature/secret.txt"]}"#, "must not contain '..'")]
    #[case::nested_parent_dir(r#"{"sharedFiles": ["conf/../../x"]}"#, "must not contain '..'")]
    #[case::absolute(r#"{"sharedFiles": ["/etc/hosts"]}"#, "relative to the tree root")]
    #[case::ignored_parent_dir(
        r#"{"sharedFiles": [".env"], "ignorePatterns": ["../*"]}"#,
        "ignorePatterns pattern"
    )]
    #[case::blank_source(r#"{"sharedFiles": [".env"], "sourceWorktree": ""}"#, "sourceWorktree")]
    fn test_invalid_document_rejected(#[case] json: &str, #[case] expected: &str) {
        let config: SyncConfig = serde_json::from_str(json).unwrap();
        match config.validate() {
            Err(Error::ConfigInvalid { message }) => {
                assert!(message.contains(expected), "message: {message}")
            }
            other => panic!("expected ConfigInvalid, got {other:?}"),
        }
    }

    #[rstest]
    #[case::shared(r#"{"sharedFiles": ["[unclosed"]}"#)]
    #[case::ignored(r#"{"sharedFiles": [".env"], "ignorePatterns": ["a[b"]}"#)]
    fn test_malformed_glob_rejected(#[case] json: &str) {
        let config: SyncConfig = serde_json::from_str(json).unwrap();
        assert!(matches!(config.validate(), Err(Error::Pattern { .. })));
    }

    #[test]
    fn test_blank_hook_rejected() {
        let mut config = SyncConfig::with_patterns([".env"]);
        config.hooks.after_sync = Some("  ".into());
        assert!(matches!(config.validate(), Err(Error::ConfigInvalid { .. })));
    }

    #[test]
    fn test_unknown_link_mode_fails_to_parse() {
        let result: std::result::Result<SyncConfig, _> =
            serde_json::from_str(r#"{"sharedFiles": [".env"], "linkMode": "hard"}"#);
        assert!(result.is_err());
        assert!("hard".parse::<LinkMode>().is_err());
        assert_eq!("absolute".parse::<LinkMode>().unwrap(), LinkMode::Absolute);
    }

    #[test]
    fn test_serialization_omits_unset_optionals() {
        let json = serde_json::to_string(&SyncConfig::with_patterns([".env"])).unwrap();
        assert!(!json.contains("$schema"));
        assert!(!json.contains("sourceWorktree"));
        assert!(json.contains("\"linkMode\":\"relative\""));
    }
}
