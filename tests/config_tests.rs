use std::env;

use serial_test::serial;

use central::config::{CentralConfig, DEFAULT_ADMIN_PASSWORD};
use central::errors::CentralError;

const VARS: [&str; 10] = [
    "CENTRAL_SERVER_HOST",
    "CENTRAL_SERVER_PORT",
    "CENTRAL_DATABASE_URL",
    "CENTRAL_LATEST_VERSION",
    "CENTRAL_RELEASE_DATE",
    "CENTRAL_CHANGELOG_URL",
    "CENTRAL_RELEASE_CRITICAL",
    "MASTER_ADMIN_USERNAME",
    "MASTER_ADMIN_PASSWORD",
    "CENTRAL_LOG_LEVEL",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn defaults_apply_without_overrides() {
    clear_env();

    let config = CentralConfig::load().expect("defaults are valid");
    assert_eq!(config.bind_address(), "0.0.0.0:8001");
    assert_eq!(config.database.url, "sqlite://instances.db");
    assert_eq!(config.release.latest_version, "1.0.0");
    assert_eq!(config.admin.username, "admin");
    assert_eq!(config.admin.password, DEFAULT_ADMIN_PASSWORD);
    assert!(config.uses_default_admin_password());
}

#[test]
#[serial]
fn env_overrides_take_precedence() {
    clear_env();
    env::set_var("CENTRAL_SERVER_PORT", "9100");
    env::set_var("CENTRAL_LATEST_VERSION", "2.3.1");
    env::set_var("CENTRAL_RELEASE_CRITICAL", "true");
    env::set_var("MASTER_ADMIN_USERNAME", "ops");
    env::set_var("MASTER_ADMIN_PASSWORD", "not-the-default");

    let config = CentralConfig::load().expect("overrides are valid");
    assert_eq!(config.server.port, 9100);
    assert_eq!(config.release.latest_version, "2.3.1");
    assert!(config.release.critical);
    assert_eq!(config.admin.username, "ops");
    assert!(!config.uses_default_admin_password());

    clear_env();
}

#[test]
#[serial]
fn invalid_log_level_is_rejected() {
    clear_env();
    env::set_var("CENTRAL_LOG_LEVEL", "chatty");

    let result = CentralConfig::load();
    assert!(matches!(result, Err(CentralError::ConfigError(_))));

    clear_env();
}

#[test]
fn admin_password_is_redacted_in_debug_output() {
    let config = CentralConfig::default();
    let debug = format!("{:?}", config.admin);
    assert!(!debug.contains(DEFAULT_ADMIN_PASSWORD));
    assert!(debug.contains("<redacted>"));
}
