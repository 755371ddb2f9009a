//! CLI configuration handling.

use std::path::{Path, PathBuf};

use dbsync_merge::MergeConfig;

use crate::error::{CliError, CliResult};

/// Default config file name (lives in the working directory)
pub const CONFIG_FILE_NAME: &str = "dbsync.toml";

/// Load the merge configuration.
///
/// An explicit path must exist. Without one, `dbsync.toml` in `dir` is used
/// when present, otherwise the defaults.
pub fn load(explicit: Option<&Path>, dir: &Path) -> CliResult<MergeConfig> {
    match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            Ok(MergeConfig::from_file(path)?)
        }
        None => {
            let default = default_path(dir);
            if default.exists() {
                Ok(MergeConfig::from_file(&default)?)
            } else {
                Ok(MergeConfig::default())
            }
        }
    }
}

/// `dbsync.toml` inside `dir`.
pub fn default_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbsync_merge::Dialect;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(None, dir.path()).unwrap();
        assert_eq!(config, MergeConfig::default());
    }

    #[test]
    fn test_reads_default_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(default_path(dir.path()), "dialect = \"mysql\"\n").unwrap();

        let config = load(None, dir.path()).unwrap();
        assert_eq!(config.dialect, Dialect::MySql);
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("other.toml");

        let err = load(Some(&missing), dir.path()).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(default_path(dir.path()), "dialect = \"oracle\"\n").unwrap();

        let err = load(None, dir.path()).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }
}
