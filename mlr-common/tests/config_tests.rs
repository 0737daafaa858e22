//! Configuration file loading and priority resolution

use mlr_common::config::{load_toml_config, ConfigOverrides, ServiceConfig, DEFAULT_PORT};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_missing_config_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let loaded = load_toml_config(&dir.path().join("absent.toml")).unwrap();
    assert!(loaded.is_none());

    let config = ServiceConfig::resolve(ConfigOverrides::default(), loaded).unwrap();
    assert_eq!(config.port, DEFAULT_PORT);
}

#[test]
fn test_toml_values_applied() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mlr.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        r#"
[server]
host = "0.0.0.0"
port = 8081
enable_admin = false

[database]
path = "/var/lib/mlr/test.db"
max_connections = 4
call_timeout_ms = 250

[logging]
level = "debug"
"#
    )
    .unwrap();

    let loaded = load_toml_config(&path).unwrap();
    let config = ServiceConfig::resolve(ConfigOverrides::default(), loaded).unwrap();

    assert_eq!(config.bind_addr(), "0.0.0.0:8081");
    assert!(!config.enable_admin);
    assert_eq!(config.database.path, PathBuf::from("/var/lib/mlr/test.db"));
    assert_eq!(config.database.max_connections, 4);
    assert_eq!(config.database.call_timeout, Duration::from_millis(250));
    assert_eq!(config.log_level, "debug");
}

#[test]
fn test_overrides_win_over_toml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mlr.toml");
    std::fs::write(&path, "[server]\nport = 8081\n[database]\npath = \"from-file.db\"\n").unwrap();

    let overrides = ConfigOverrides {
        port: Some(9999),
        database: Some(PathBuf::from("from-cli.db")),
        ..Default::default()
    };
    let config = ServiceConfig::resolve(overrides, load_toml_config(&path).unwrap()).unwrap();

    assert_eq!(config.port, 9999);
    assert_eq!(config.database.path, PathBuf::from("from-cli.db"));
}

#[test]
fn test_malformed_toml_is_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mlr.toml");
    std::fs::write(&path, "[server\nport = ").unwrap();

    let err = load_toml_config(&path).unwrap_err();
    assert!(matches!(err, mlr_common::Error::Config(_)), "got {err:?}");
}
