//! Configuration management for myvault
//!
//! Read from `~/.config/myvault/config.json`, or from the path in
//! `MYVAULT_CONFIG` when set. A missing file means defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::Paths;

/// Environment variable that overrides the config file location
pub const CONFIG_ENV: &str = "MYVAULT_CONFIG";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Environment variable holding the vault password
    #[serde(default = "default_password_env")]
    pub password_env: String,

    /// Log file location (defaults to the data directory)
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Vault file used when `-f/--file` is not given
    #[serde(default)]
    pub default_file: Option<PathBuf>,
}

fn default_password_env() -> String {
    "VAULT_PASSWORD".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            password_env: default_password_env(),
            log_file: None,
            default_file: None,
        }
    }
}

impl Config {
    /// Load config from the default location
    pub fn load_default() -> Result<Self> {
        let path = match std::env::var_os(CONFIG_ENV) {
            Some(p) if !p.is_empty() => PathBuf::from(p),
            _ => Paths::new().config_file(),
        };
        Self::load(&path)
    }

    /// Load config from file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Log file to write to, falling back to the standard location
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| Paths::new().log_file())
    }

    /// Read the vault password from the configured environment variable.
    /// Unset and empty are both treated as missing.
    pub fn password(&self) -> Option<String> {
        std::env::var(&self.password_env)
            .ok()
            .filter(|p| !p.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() -> Result<()> {
        let tmp = TempDir::new()?;
        let config = Config::load(&tmp.path().join("nope.json"))?;
        assert_eq!(config.password_env, "VAULT_PASSWORD");
        assert!(config.default_file.is_none());
        Ok(())
    }

    #[test]
    fn test_partial_file_fills_defaults() -> Result<()> {
        let tmp = TempDir::new()?;
        let path = tmp.path().join("config.json");
        std::fs::write(&path, r#"{"default_file": "/tmp/vault.json"}"#)?;

        let config = Config::load(&path)?;
        assert_eq!(config.password_env, "VAULT_PASSWORD");
        assert_eq!(config.default_file, Some(PathBuf::from("/tmp/vault.json")));
        Ok(())
    }

    #[test]
    fn test_invalid_file_is_an_error() -> Result<()> {
        let tmp = TempDir::new()?;
        let path = tmp.path().join("config.json");
        std::fs::write(&path, "{not json")?;
        assert!(Config::load(&path).is_err());
        Ok(())
    }

    #[test]
    fn test_password_from_custom_env() {
        let config = Config {
            password_env: "MYVAULT_TEST_PASSWORD_UNSET_VAR".to_string(),
            ..Config::default()
        };
        assert!(config.password().is_none());
    }

    #[test]
    fn test_explicit_log_file_wins() {
        let config = Config {
            log_file: Some(PathBuf::from("/var/tmp/vault.log")),
            ..Config::default()
        };
        assert_eq!(config.log_path(), PathBuf::from("/var/tmp/vault.log"));
    }
}
