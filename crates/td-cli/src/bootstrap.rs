use td_config::TaskdeckConfig;

/// Load `.env` (if present), then the layered configuration.
pub fn load_config() -> anyhow::Result<TaskdeckConfig> {
    TaskdeckConfig::load_with_dotenv().map_err(anyhow::Error::from)
}

/// Database location: `--db` wins over the configured path.
#[must_use]
pub fn resolve_db_path(db_override: Option<&str>, config: &TaskdeckConfig) -> String {
    db_override.map_or_else(|| config.database.path.clone(), str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_over_config() {
        let config = TaskdeckConfig::default();
        assert_eq!(resolve_db_path(Some("other.db"), &config), "other.db");
        assert_eq!(resolve_db_path(None, &config), "taskdeck.db");
    }
}
