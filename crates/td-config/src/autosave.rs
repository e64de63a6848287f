//! Auto-save debounce settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Quiet period after the last edit before a task is saved.
const fn default_debounce_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AutoSaveConfig {
    /// Debounce window in milliseconds. Must be greater than zero.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl AutoSaveConfig {
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when `debounce_ms` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.debounce_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "autosave.debounce_ms".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}
