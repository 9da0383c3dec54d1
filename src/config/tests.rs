use super::load_config;
use super::settings::{ConsumerSettings, Settings};
use serial_test::serial;
use std::env;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.consumer.msg_timeout_ms, None);
    assert_eq!(settings.consumer.requeue_delay_secs, 90);
    assert_eq!(settings.consumer.max_requeue_delay_secs, 900);
    assert_eq!(settings.logging.level, "info");
}

#[test]
fn test_requeue_delay_grows_with_attempts_and_caps() {
    let consumer = ConsumerSettings::default();
    assert_eq!(consumer.requeue_delay_ms(1), 90_000);
    assert_eq!(consumer.requeue_delay_ms(3), 270_000);
    assert_eq!(consumer.requeue_delay_ms(50), 900_000);
    assert_eq!(consumer.requeue_delay_ms(0), 0);
}

#[test]
fn test_msg_timeout_is_optional() {
    let mut consumer = ConsumerSettings::default();
    assert_eq!(consumer.msg_timeout(), None);
    consumer.msg_timeout_ms = Some(1500);
    assert_eq!(consumer.msg_timeout(), Some(Duration::from_millis(1500)));
}

#[test]
#[serial]
fn load_config_from_file_overrides_defaults() {
    // Run from a temporary directory so load_config picks up
    // config/default.toml from there.
    let tmp = TempDir::new().expect("create tempdir");
    let orig = env::current_dir().expect("current_dir");
    env::set_current_dir(tmp.path()).expect("set current dir");

    fs::create_dir_all("config").expect("create config dir");
    let toml = r#"
        [consumer]
        msg_timeout_ms = 30000
        requeue_delay_secs = 5

        [logging]
        level = "debug"
    "#;
    fs::write("config/default.toml", toml).expect("write config file");

    let cfg = load_config();

    // restore cwd before asserting so a failure does not leak into other tests
    env::set_current_dir(orig).expect("restore cwd");

    let cfg = cfg.expect("load_config failed");
    assert_eq!(cfg.consumer.msg_timeout_ms, Some(30_000));
    assert_eq!(cfg.consumer.requeue_delay_secs, 5);
    assert_eq!(cfg.consumer.max_requeue_delay_secs, 900);
    assert_eq!(cfg.logging.level, "debug");
}

#[test]
#[serial]
fn load_config_from_environment() {
    temp_env::with_vars(
        [
            ("NSQMSG_CONSUMER__MSG_TIMEOUT_MS", Some("2500")),
            ("NSQMSG_CONSUMER__MAX_REQUEUE_DELAY_SECS", Some("60")),
            ("NSQMSG_LOGGING__LEVEL", Some("trace")),
        ],
        || {
            let cfg = load_config().expect("load_config failed");
            assert_eq!(cfg.consumer.msg_timeout_ms, Some(2500));
            assert_eq!(cfg.consumer.requeue_delay_secs, 90);
            assert_eq!(cfg.consumer.max_requeue_delay_secs, 60);
            assert_eq!(cfg.logging.level, "trace");
        },
    );
}

#[test]
#[serial]
fn load_config_without_sources_uses_defaults() {
    let cfg = load_config().expect("load_config failed");
    assert_eq!(cfg.consumer, ConsumerSettings::default());
}
