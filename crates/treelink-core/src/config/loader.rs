//! Loading `treelink.json` from disk

use std::fs;
use std::path::{Path, PathBuf};

use treelink_fs::CONFIG_FILE_NAME;

use super::schema::{LinkMode, SyncConfig};
use crate::{Error, Result};

/// Location of the configuration file for a tree rooted at `root`.
pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// Read, parse, and validate the configuration at `path`.
pub fn load_config(path: &Path) -> Result<SyncConfig> {
    if !path.is_file() {
        return Err(Error::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = fs::read_to_string(path)?;
    tracing::debug!(path = %path.display(), "loading configuration");
    parse_config(&content).map_err(|e| match e {
        Error::Json(err) => Error::ConfigParse {
            path: path.to_path_buf(),
            message: err.to_string(),
        },
        other => other,
    })
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<SyncConfig> {
    let value: serde_json::Value = serde_json::from_str(content)?;

    // Surface a bad enum as a validation failure rather than a parse failure.
    if let Some(mode) = value.get("linkMode") {
        match mode.as_str() {
            Some(s) => {
                s.parse::<LinkMode>()?;
            }
            None => return Err(Error::config("linkMode must be a string")),
        }
    }

    let config: SyncConfig = serde_json::from_value(value)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let result = load_config(&config_path(temp.path()));
        assert!(matches!(result, Err(Error::ConfigNotFound { .. })));
    }

    #[test]
    fn test_load_valid_file() {
        let temp = TempDir::new().unwrap();
        fs::write(
            config_path(temp.path()),
            r#"{"sharedFiles": [".env"], "overwriteExisting": true}"#,
        )
        .unwrap();
        let config = load_config(&config_path(temp.path())).unwrap();
        assert_eq!(config.shared_files, vec![".env"]);
        assert!(config.overwrite_existing);
    }

    #[test]
    fn test_load_malformed_json_reports_path() {
        let temp = TempDir::new().unwrap();
        let path = config_path(temp.path());
        fs::write(&path, "{ not json").unwrap();
        match load_config(&path) {
            Err(Error::ConfigParse { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected ConfigParse, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_link_mode_is_config_invalid() {
        let err = parse_config(r#"{"sharedFiles": [".env"], "linkMode": "hard"}"#).unwrap_err();
        assert!(matches!(err, Error::ConfigInvalid { .. }), "got {err:?}");
    }

    #[test]
    fn test_missing_shared_files_is_parse_error() {
        let err = parse_config(r#"{"linkMode": "relative"}"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)), "got {err:?}");
    }

    #[test]
    fn test_empty_shared_files_is_config_invalid() {
        let err = parse_config(r#"{"sharedFiles": []}"#).unwrap_err();
        assert!(matches!(err, Error::ConfigInvalid { .. }), "got {err:?}");
    }
}
