//! # Configuration Tests
//!
//! Layered loading: defaults, YAML file with `${VAR}` substitution, and
//! environment overrides.

use std::env;
use std::fs;
use std::sync::Mutex;
use tempfile::tempdir;
use versetag_server::config::{get_config, ConfigError};

// Environment variables are process-global; tests touching them run one at a time.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env_vars() {
    for var in [
        "PORT",
        "DB_URL",
        "JWT_SECRET",
        "VERSETAG_PORT",
        "VERSETAG_DB_URL",
        "VERSETAG_JWT_SECRET",
        "VERSETAG_TEST_DB_PATH",
    ] {
        env::remove_var(var);
    }
}

#[test]
fn test_yaml_file_values_are_loaded() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env_vars();

    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yml");
    fs::write(
        &path,
        "port: 7070\ndb_url: \"/tmp/tags.db\"\njwt_secret: \"from-file\"\n",
    )
    .unwrap();

    let config = get_config(Some(path.to_str().unwrap())).unwrap();
    assert_eq!(config.port, 7070);
    assert_eq!(config.db_url, "/tmp/tags.db");
    assert_eq!(config.jwt_secret, "from-file");
}

#[test]
fn test_missing_keys_fall_back_to_defaults() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env_vars();

    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yml");
    fs::write(&path, "db_url: \"only-db.db\"\n").unwrap();

    let config = get_config(Some(path.to_str().unwrap())).unwrap();
    assert_eq!(config.port, 9090);
    assert_eq!(config.db_url, "only-db.db");
    assert_eq!(config.jwt_secret, "a-secure-secret-key");
}

#[test]
fn test_placeholders_are_substituted_from_env() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env_vars();
    env::set_var("VERSETAG_TEST_DB_PATH", "/data/substituted.db");

    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yml");
    fs::write(&path, "db_url: \"${VERSETAG_TEST_DB_PATH}\"\n").unwrap();

    let config = get_config(Some(path.to_str().unwrap())).unwrap();
    assert_eq!(config.db_url, "/data/substituted.db");
    clear_env_vars();
}

#[test]
fn test_environment_overrides_file() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env_vars();
    env::set_var("PORT", "9999");
    env::set_var("VERSETAG_JWT_SECRET", "from-env");

    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yml");
    fs::write(&path, "port: 7070\njwt_secret: \"from-file\"\n").unwrap();

    let config = get_config(Some(path.to_str().unwrap())).unwrap();
    assert_eq!(config.port, 9999);
    assert_eq!(config.jwt_secret, "from-env");
    clear_env_vars();
}

#[test]
fn test_explicit_missing_file_is_an_error() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env_vars();

    let result = get_config(Some("/definitely/not/here/config.yml"));
    assert!(matches!(result, Err(ConfigError::NotFound(_))));
}
