//! Persisted shell settings
//!
//! A single small JSON file under the platform config directory. The only
//! setting owned by this layer today is the theme choice; the struct is
//! `#[serde(default)]` so old config files keep loading as fields are added.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings the shell persists across sessions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Theme filename chosen by the user, `None` until one is picked
    pub theme: Option<String>,
}

impl ShellConfig {
    /// Default location: `<config_dir>/atelier/config.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("atelier").join("config.json"))
    }

    /// Load from `path`. A missing file yields defaults; a present but
    /// unparseable file is an error the caller can surface.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config at {}", path.display()))
    }

    /// Write to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create config directory {}", parent.display())
            })?;
        }
        let json = serde_json::to_string_pretty(self).context("failed to serialize config")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write config at {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_loads_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let config = ShellConfig::load_from(&temp.path().join("config.json")).unwrap();
        assert_eq!(config, ShellConfig::default());
        assert!(config.theme.is_none());
    }

    #[test]
    fn test_save_and_reload() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("nested").join("config.json");

        let config = ShellConfig {
            theme: Some("gruvbox_dark.json".to_string()),
        };
        config.save_to(&path).unwrap();

        let reloaded = ShellConfig::load_from(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_unknown_fields_are_tolerated() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(&path, r#"{"theme":"dark.json","futureSetting":42}"#).unwrap();

        let config = ShellConfig::load_from(&path).unwrap();
        assert_eq!(config.theme.as_deref(), Some("dark.json"));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(ShellConfig::load_from(&path).is_err());
    }
}
