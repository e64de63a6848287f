//! # td-config
//!
//! Layered configuration loading for Taskdeck using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`TASKDECK_*` prefix, `__` as separator)
//! 2. Project-level `.taskdeck/config.toml`
//! 3. User-level `~/.config/taskdeck/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `TASKDECK_DATABASE__PATH` -> `database.path`,
//! `TASKDECK_AUTOSAVE__DEBOUNCE_MS` -> `autosave.debounce_ms`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use td_config::TaskdeckConfig;
//!
//! let config = TaskdeckConfig::load_with_dotenv().expect("config");
//! println!("saving {}ms after the last edit", config.autosave.debounce_ms);
//! ```

mod autosave;
mod database;
mod error;
mod logging;

pub use autosave::AutoSaveConfig;
pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use logging::LoggingConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TaskdeckConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub autosave: AutoSaveConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TaskdeckConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be parsed or a value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment())
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be parsed or a value is invalid.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Extract and validate from an arbitrary figment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is invalid.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.autosave.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".taskdeck/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("TASKDECK_").split("__"))
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("taskdeck").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_loads() {
        let config = TaskdeckConfig::default();
        assert_eq!(config.database.path, "taskdeck.db");
        assert_eq!(config.autosave.debounce_ms, 1000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn defaults_survive_figment_extraction() {
        let figment = Figment::from(Serialized::defaults(TaskdeckConfig::default()));
        let config = TaskdeckConfig::from_figment(figment).expect("should extract defaults");
        assert_eq!(config.autosave.debounce_ms, 1000);
    }
}
