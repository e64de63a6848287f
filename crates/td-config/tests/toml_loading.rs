//! Integration tests for TOML configuration loading.
//!
//! Uses figment::Jail for safe, sandboxed env var manipulation.

use figment::{
    Figment, Jail,
    providers::{Env, Format, Serialized, Toml},
};
use pretty_assertions::assert_eq;
use td_config::{ConfigError, TaskdeckConfig};

#[test]
fn loads_all_sections_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[database]
path = "/var/lib/taskdeck/tasks.db"

[autosave]
debounce_ms = 250

[logging]
level = "td_autosave=debug"
"#,
        )?;

        let config: TaskdeckConfig = Figment::from(Serialized::defaults(TaskdeckConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.database.path, "/var/lib/taskdeck/tasks.db");
        assert_eq!(config.autosave.debounce_ms, 250);
        assert_eq!(config.logging.level, "td_autosave=debug");
        Ok(())
    });
}

#[test]
fn partial_toml_keeps_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[autosave]
debounce_ms = 500
"#,
        )?;

        let config: TaskdeckConfig = Figment::from(Serialized::defaults(TaskdeckConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.autosave.debounce_ms, 500);
        assert_eq!(config.database.path, "taskdeck.db");
        assert_eq!(config.logging.level, "info");
        Ok(())
    });
}

#[test]
fn env_overrides_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[database]
path = "from-toml.db"
"#,
        )?;
        jail.set_env("TASKDECK_DATABASE__PATH", ":memory:");

        let config: TaskdeckConfig = Figment::from(Serialized::defaults(TaskdeckConfig::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("TASKDECK_").split("__"))
            .extract()?;

        assert!(config.database.is_in_memory());
        Ok(())
    });
}

#[test]
fn project_local_config_is_picked_up() {
    Jail::expect_with(|jail| {
        jail.create_dir(".taskdeck")?;
        jail.create_file(
            ".taskdeck/config.toml",
            r#"
[autosave]
debounce_ms = 1500
"#,
        )?;

        let config = TaskdeckConfig::load().expect("config loads");
        assert_eq!(config.autosave.debounce_ms, 1500);
        Ok(())
    });
}

#[test]
fn zero_debounce_fails_validation() {
    Jail::expect_with(|jail| {
        jail.set_env("TASKDECK_AUTOSAVE__DEBOUNCE_MS", "0");

        let result = TaskdeckConfig::load();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
        Ok(())
    });
}
