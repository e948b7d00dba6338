use super::set_logging_for_tests;
use super::{init_logging, log_debug, log_debug_content, log_file_path};
use crate::config::AppConfig;
use clap::Parser;
use std::env;
use std::fs;
use std::sync::{Mutex, OnceLock};

static LOG_TEST_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn with_log_lock(action: impl FnOnce()) {
    let _guard = LOG_TEST_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let _ = fs::remove_file(log_file_path());
    action();
    set_logging_for_tests(false, false);
}

fn clear_log_env() {
    env::remove_var("POSEWATCH_LOGS");
    env::remove_var("POSEWATCH_NO_LOGS");
    env::remove_var("POSEWATCH_LOG_CONTENT");
}

fn test_config() -> AppConfig {
    clear_log_env();
    AppConfig::parse_from(["posewatch-tests"])
}

#[test]
fn logging_disabled_by_default() {
    with_log_lock(|| {
        init_logging(&test_config());
        log_debug("should-not-write");
        assert!(fs::metadata(log_file_path()).is_err());
    });
}

#[test]
fn logging_enabled_writes_log() {
    with_log_lock(|| {
        let mut config = test_config();
        config.logs = true;
        init_logging(&config);
        log_debug("log-enabled");
        let contents = fs::read_to_string(log_file_path()).expect("log file should be created");
        assert!(contents.contains("log-enabled"));
    });
}

#[test]
fn no_logs_overrides_logs() {
    with_log_lock(|| {
        let mut config = test_config();
        config.logs = true;
        config.no_logs = true;
        init_logging(&config);
        log_debug("suppressed");
        assert!(fs::metadata(log_file_path()).is_err());
    });
}

#[test]
fn log_content_requires_flag() {
    with_log_lock(|| {
        let mut config = test_config();
        config.logs = true;
        config.log_content = false;
        init_logging(&config);
        log_debug_content("session code ABC123");
        let contents = fs::read_to_string(log_file_path()).unwrap_or_default();
        assert!(
            !contents.contains("ABC123"),
            "content should not be logged without --log-content"
        );

        config.log_content = true;
        init_logging(&config);
        log_debug_content("session code XYZ789");
        let contents = fs::read_to_string(log_file_path()).expect("log file");
        assert!(contents.contains("XYZ789"));
    });
}

#[test]
fn env_var_enables_logging() {
    with_log_lock(|| {
        clear_log_env();
        env::set_var("POSEWATCH_LOGS", "true");
        let config = AppConfig::parse_from(["posewatch-tests"]);
        clear_log_env();
        assert!(config.logs);
    });
}
