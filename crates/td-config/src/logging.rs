//! Log level used when `TASKDECK_LOG` is not set.

use serde::{Deserialize, Serialize};

fn default_level() -> String {
    String::from("info")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// An `EnvFilter` directive, e.g. `"info"` or `"td_autosave=debug"`.
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}
