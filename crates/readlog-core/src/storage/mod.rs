//! Local persistence: data directory, TOML config, SQLite database.

mod config;
pub mod database;

pub use config::Config;
pub use database::Database;

use std::path::PathBuf;

use crate::error::{ConfigError, CoreError};

/// Returns `~/.config/readlog[-dev]/` based on READLOG_ENV.
///
/// Set READLOG_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, CoreError> {
    let base_dir = dirs::home_dir()
        .ok_or(ConfigError::NoHomeDir)?
        .join(".config");

    let env = std::env::var("READLOG_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("readlog-dev")
    } else {
        base_dir.join("readlog")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
