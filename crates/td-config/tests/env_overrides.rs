use figment::Jail;
use pretty_assertions::assert_eq;
use td_config::TaskdeckConfig;

#[test]
fn env_vars_fill_config_values() {
    Jail::expect_with(|jail| {
        jail.set_env("TASKDECK_AUTOSAVE__DEBOUNCE_MS", "750");
        jail.set_env("TASKDECK_LOGGING__LEVEL", "warn");

        let config = TaskdeckConfig::load().expect("config loads");
        assert_eq!(config.autosave.debounce_ms, 750);
        assert_eq!(config.logging.level, "warn");
        Ok(())
    });
}

#[test]
fn malformed_env_value_is_an_error() {
    Jail::expect_with(|jail| {
        jail.set_env("TASKDECK_AUTOSAVE__DEBOUNCE_MS", "soon");

        assert!(TaskdeckConfig::load().is_err());
        Ok(())
    });
}
