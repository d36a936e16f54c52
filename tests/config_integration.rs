//! Integration tests for loading and saving `config.toml`.

use std::fs;
use std::time::Duration;

use quizchat::Config;
use tempfile::TempDir;

#[test]
fn missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let config = Config::load(Some(dir.path().join("absent.toml").as_path())).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn loads_values_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "base_url = \"http://172.30.1.27:8001/\"\nhealth_interval_secs = 5\n\n[ui]\ntick_rate_ms = 100\n",
    )
    .unwrap();

    let config = Config::load(Some(path.as_path())).unwrap();
    assert_eq!(config.base_url, "http://172.30.1.27:8001");
    assert_eq!(config.health_interval(), Duration::from_secs(5));
    assert_eq!(config.tick_rate(), Duration::from_millis(100));
    assert!(config.ui.show_timestamps);
}

#[test]
fn invalid_files_are_rejected_with_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    fs::write(&path, "base_url = [").unwrap();
    let err = Config::load(Some(path.as_path())).unwrap_err();
    assert!(format!("{:#}", err).contains("config.toml"));

    fs::write(&path, "health_interval_secs = 0").unwrap();
    assert!(Config::load(Some(path.as_path())).is_err());
}

#[test]
fn saved_config_loads_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = Config::default();
    config.override_base_url(Some("http://quiz.internal:8001"));
    config.ui.show_timestamps = false;
    config.save(&path).unwrap();

    assert_eq!(Config::load(Some(path.as_path())).unwrap(), config);
}
