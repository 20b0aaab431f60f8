//! Integration tests for TOML configuration loading.
//!
//! Uses figment::Jail for sandboxed files and env vars.

use figment::{
    Figment, Jail,
    providers::{Format, Serialized, Toml},
};
use sg_config::SgConfig;

#[test]
fn loads_rule_thresholds_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[rules]
spacing_threshold = 3
byte_limit = 1200
forbidden_terms = ["학원"]
"#,
        )?;

        let config: SgConfig = Figment::from(Serialized::defaults(SgConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.rules.spacing_threshold, 3);
        assert_eq!(config.rules.byte_limit, 1200);
        assert_eq!(config.rules.forbidden_terms, vec!["학원".to_string()]);
        assert_eq!(config.polling.interval_secs, 5);
        Ok(())
    });
}

#[test]
fn project_config_is_picked_up_by_load() {
    Jail::expect_with(|jail| {
        jail.create_dir(".saenggi")?;
        jail.create_file(
            ".saenggi/config.toml",
            r"
[orchestrator]
max_concurrent_files = 2
stale_after_secs = 60

[polling]
interval_secs = 1
max_attempts = 10
",
        )?;

        let config = SgConfig::load().expect("config loads");
        assert_eq!(config.orchestrator.max_concurrent_files, 2);
        assert_eq!(config.orchestrator.stale_after_secs, 60);
        assert_eq!(config.polling.interval_secs, 1);
        assert_eq!(config.polling.max_attempts, 10);
        Ok(())
    });
}

#[test]
fn invalid_project_config_is_rejected() {
    Jail::expect_with(|jail| {
        jail.create_dir(".saenggi")?;
        jail.create_file(
            ".saenggi/config.toml",
            r"
[polling]
max_attempts = 0
",
        )?;

        let err = SgConfig::load().unwrap_err();
        assert!(err.to_string().contains("polling.max_attempts"));
        Ok(())
    });
}
