//! Tool configuration for jade
//!
//! Controls which external binaries archive and mirror the store, and where
//! the default store lives. The per-store default remote is not kept here;
//! it lives in the store's own settings table so it travels with the store.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::JadeError;

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV: &str = "JADE_CONFIG";

/// User configuration for jade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Archiving tool binary
    #[serde(default = "default_tar_binary")]
    pub tar_binary: PathBuf,

    /// Mirroring tool binary
    #[serde(default = "default_rsync_binary")]
    pub rsync_binary: PathBuf,

    /// Flags passed to the mirroring tool before source and destination
    #[serde(default = "default_rsync_args")]
    pub rsync_args: Vec<String>,

    /// Store directory used when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_dir: Option<PathBuf>,
}

fn default_tar_binary() -> PathBuf {
    PathBuf::from("tar")
}

fn default_rsync_binary() -> PathBuf {
    PathBuf::from("rsync")
}

fn default_rsync_args() -> Vec<String> {
    vec!["-az".to_string(), "--delete".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tar_binary: default_tar_binary(),
            rsync_binary: default_rsync_binary(),
            rsync_args: default_rsync_args(),
            store_dir: None,
        }
    }
}

impl Config {
    /// Locate the configuration file: `$JADE_CONFIG`, else the platform
    /// config directory
    pub fn default_location() -> Option<PathBuf> {
        if let Ok(custom) = std::env::var(CONFIG_ENV) {
            return Some(PathBuf::from(custom));
        }
        ProjectDirs::from("", "", "jade").map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from `path`, or defaults if the file doesn't exist
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, JadeError> {
        let Some(path) = path.filter(|p| p.exists()) else {
            return Ok(Self::default());
        };

        let contents = std::fs::read_to_string(path)
            .map_err(|e| JadeError::Io(format!("Failed to read config file: {}", e)))?;

        serde_json::from_str(&contents).map_err(|e| {
            JadeError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.tar_binary, PathBuf::from("tar"));
        assert_eq!(config.rsync_args, vec!["-az", "--delete"]);
        assert!(config.store_dir.is_none());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        let config = Config::load_or_default(Some(&path)).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, r#"{"store_dir": "/srv/jade", "tar_binary": "gtar"}"#).unwrap();

        let config = Config::load_or_default(Some(&path)).unwrap();
        assert_eq!(config.store_dir, Some(PathBuf::from("/srv/jade")));
        assert_eq!(config.tar_binary, PathBuf::from("gtar"));
        assert_eq!(config.rsync_binary, PathBuf::from("rsync"));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();

        let err = Config::load_or_default(Some(&path)).unwrap_err();
        assert!(matches!(err, JadeError::Config(_)));
    }
}
