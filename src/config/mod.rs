pub mod schema;

pub use schema::{BridgeConfig, API_KEY_ENV};

use crate::errors::ConfigError;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Default home directory (~/.gemini-bridge).
pub fn default_home_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().join(".gemini-bridge"))
        .unwrap_or_else(|| PathBuf::from(".gemini-bridge"))
}

/// Default config file path.
pub fn default_config_path() -> PathBuf {
    default_home_dir().join("config.toml")
}

/// Load config from the given path, or return defaults. Env overrides are
/// not applied here, see [`BridgeConfig::with_env_overrides`].
pub fn load_config(path: &Path) -> Result<BridgeConfig, ConfigError> {
    if !path.exists() {
        return Ok(BridgeConfig::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Save config to the given path (TOML format).
pub fn save_config(config: &BridgeConfig, path: &Path) -> Result<()> {
    let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents).context("Failed to write config file")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg.model, BridgeConfig::default().model);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = BridgeConfig {
            api_key: "k".into(),
            project_root: "/tmp/project".into(),
            verbose: true,
            ..Default::default()
        };
        save_config(&cfg, &path).unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.api_key, "k");
        assert!(loaded.verbose);
        assert_eq!(loaded.resolved_project_root().as_deref(), Some("/tmp/project"));
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "verbose = \"maybe\"").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Parse { .. })));
    }
}
