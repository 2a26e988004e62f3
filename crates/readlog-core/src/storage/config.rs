//! TOML-based application configuration.
//!
//! Stores the remote API location (if any) and the guidance thresholds.
//! Configuration is stored at `~/.config/readlog/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, CoreError};
use crate::stats::Analyzer;

use super::data_dir;

/// Remote API configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the hosted reading API. When unset, sessions live in
    /// the local database.
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Guidance thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalsConfig {
    #[serde(default = "default_daily_goal_secs")]
    pub daily_goal_secs: i64,
    #[serde(default = "default_min_session_secs")]
    pub min_session_secs: i64,
}

fn default_daily_goal_secs() -> i64 {
    600
}
fn default_min_session_secs() -> i64 {
    120
}

impl Default for GoalsConfig {
    fn default() -> Self {
        Self {
            daily_goal_secs: default_daily_goal_secs(),
            min_session_secs: default_min_session_secs(),
        }
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/readlog/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub goals: GoalsConfig,
}

impl Config {
    pub fn path() -> Result<PathBuf, CoreError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location; a missing file yields defaults.
    pub fn load() -> Result<Self, CoreError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, CoreError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = toml::from_str(&raw).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), CoreError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), CoreError> {
        let raw = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, raw).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Read a dotted key, e.g. `goals.daily_goal_secs`.
    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        match key {
            "remote.base_url" => Ok(self
                .remote
                .base_url
                .clone()
                .unwrap_or_else(|| "(unset)".to_string())),
            "goals.daily_goal_secs" => Ok(self.goals.daily_goal_secs.to_string()),
            "goals.min_session_secs" => Ok(self.goals.min_session_secs.to_string()),
            _ => Err(ConfigError::UnknownKey(key.to_string())),
        }
    }

    /// Write a dotted key. An empty value unsets `remote.base_url`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let parse_secs = |value: &str| {
            value.parse::<i64>().map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })
        };
        match key {
            "remote.base_url" => {
                self.remote.base_url = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            "goals.daily_goal_secs" => self.goals.daily_goal_secs = parse_secs(value)?,
            "goals.min_session_secs" => self.goals.min_session_secs = parse_secs(value)?,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    /// Analyzer configured with this file's thresholds.
    pub fn analyzer(&self) -> Analyzer {
        Analyzer::with_thresholds(self.goals.daily_goal_secs, self.goals.min_session_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.goals.daily_goal_secs, 600);
        assert_eq!(config.goals.min_session_secs, 120);
        assert!(config.remote.base_url.is_none());
    }

    #[test]
    fn save_and_reload_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.set("remote.base_url", "https://reading.example.com").unwrap();
        config.set("goals.daily_goal_secs", "1200").unwrap();
        config.save_to(&path).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(
            reloaded.remote.base_url.as_deref(),
            Some("https://reading.example.com")
        );
        assert_eq!(reloaded.goals.daily_goal_secs, 1200);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[goals]\ndaily_goal_secs = 900\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.goals.daily_goal_secs, 900);
        assert_eq!(config.goals.min_session_secs, 120);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut config = Config::default();
        assert!(matches!(
            config.set("goals.nope", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            config.get("nope"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn threshold_values_must_parse() {
        let mut config = Config::default();
        assert!(matches!(
            config.set("goals.daily_goal_secs", "ten"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
