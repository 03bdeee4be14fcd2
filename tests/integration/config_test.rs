// Config persistence and how it feeds the pipeline

use std::fs;

use sensorboard::core::telemetry::AlertConfig;
use sensorboard::Config;
use tempfile::TempDir;

#[test]
fn test_default_config_values() {
    let config = Config::default();
    assert_eq!(config.interval_ms, 1000);
    assert_eq!(config.fast_interval_ms, 500);
    assert_eq!(config.battery_alert_min, 35.0);
    assert_eq!(config.battery_alert_max, 95.0);
    assert!(!config.prefer_gpu_panel);
    assert_eq!(config.alert_config(), AlertConfig::default());
}

#[test]
fn test_config_save_and_reload() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("sensorboard").join("config.json");

    let mut config = Config::default();
    config.set_value("fast_interval_ms", "200").unwrap();
    config.set_value("temperature_alert", "off").unwrap();
    config.set_value("dump_dir", "/var/tmp/sensors").unwrap();
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(loaded.alert_config().temperature_high, None);

    let mut cadence = loaded.cadence();
    cadence.toggle();
    assert_eq!(cadence.interval().as_millis(), 200);
}

#[test]
fn test_empty_config_file_uses_defaults() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.json");
    fs::write(&path, "").unwrap();

    assert_eq!(Config::load_from(&path).unwrap(), Config::default());
}

#[test]
fn test_config_path_is_app_specific() {
    if let Ok(path) = Config::get_config_path() {
        assert!(path.ends_with("sensorboard/config.json"));
    }
}
