use super::{load_config, load_config_from, Settings};
use crate::utils::Error;
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.domain.domain_id, 0);
    assert_eq!(settings.publisher.participant_name, "Participant_publisher");
    assert_eq!(settings.publisher.topic_name, "HelloWorldTopic");
    assert_eq!(settings.emitter.period_ms, 1000);
    assert_eq!(settings.emitter.run_secs, 10);
    assert_eq!(settings.emitter.payload, "Hullo!");
    assert_eq!(settings.transport.address(), "127.0.0.1:7400");
    assert_eq!(settings.transport.url(), "ws://127.0.0.1:7400");
    assert_eq!(settings.logging.level, "info");
}

#[test]
#[serial]
fn missing_file_yields_defaults() {
    let tmp = TempDir::new().expect("create tempdir");
    let stem = tmp.path().join("absent");
    let cfg = load_config_from(stem.to_str().unwrap()).expect("load_config_from failed");
    assert_eq!(cfg, Settings::default());
}

#[test]
#[serial]
fn load_config_from_file_overrides_defaults() {
    // load_config looks for config/default.* relative to the working directory
    let tmp = TempDir::new().expect("create tempdir");
    let orig = env::current_dir().expect("current_dir");
    env::set_current_dir(tmp.path()).expect("set current dir");

    fs::create_dir_all("config").expect("create config dir");
    let toml = r#"
        [emitter]
        period_ms = 250
        payload = "Hello from file"

        [transport]
        enabled = false
        port = 9000
    "#;
    fs::write("config/default.toml", toml).expect("write config file");

    let cfg = load_config();
    env::set_current_dir(orig).expect("restore cwd");
    let cfg = cfg.expect("load_config failed");

    assert_eq!(cfg.emitter.period_ms, 250);
    assert_eq!(cfg.emitter.payload, "Hello from file");
    // untouched keys in a touched section keep their defaults
    assert_eq!(cfg.emitter.run_secs, 10);
    assert!(!cfg.transport.enabled);
    assert_eq!(cfg.transport.port, 9000);
    assert_eq!(cfg.transport.host, "127.0.0.1");
    assert_eq!(cfg.publisher.topic_name, "HelloWorldTopic");
}

#[test]
#[serial]
fn environment_overrides_defaults() {
    let tmp = TempDir::new().expect("create tempdir");
    let stem = tmp.path().join("absent");
    temp_env::with_vars(
        [
            ("HELLO__EMITTER__RUN_SECS", Some("3")),
            ("HELLO__PUBLISHER__TOPIC_NAME", Some("OtherTopic")),
            ("HELLO__LOGGING__LEVEL", Some("debug")),
        ],
        || {
            let cfg = load_config_from(stem.to_str().unwrap()).expect("load_config_from failed");
            assert_eq!(cfg.emitter.run_secs, 3);
            assert_eq!(cfg.publisher.topic_name, "OtherTopic");
            assert_eq!(cfg.logging.level, "debug");
            assert_eq!(cfg.emitter.period_ms, 1000);
        },
    );
}

#[test]
#[serial]
fn zero_period_is_rejected() {
    let tmp = TempDir::new().expect("create tempdir");
    let stem = tmp.path().join("absent");
    temp_env::with_var("HELLO__EMITTER__PERIOD_MS", Some("0"), || {
        let err = load_config_from(stem.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("period_ms"));
    });
}
