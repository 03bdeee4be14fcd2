use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::telemetry::{AlertConfig, Cadence};

const DEFAULT_INTERVAL_MS: u64 = 1000;
const DEFAULT_FAST_INTERVAL_MS: u64 = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Normal poll period
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Poll period used while fast mode is toggled on
    #[serde(default = "default_fast_interval_ms")]
    pub fast_interval_ms: u64,
    #[serde(default = "default_battery_alert_min")]
    pub battery_alert_min: f64,
    #[serde(default = "default_battery_alert_max")]
    pub battery_alert_max: f64,
    /// Show GPU rows instead of battery rows when both are available
    #[serde(default)]
    pub prefer_gpu_panel: bool,
    #[serde(default = "default_temperature_alert")]
    pub temperature_alert: Option<f64>,
    #[serde(default = "default_memory_alert")]
    pub memory_alert: Option<f64>,
    #[serde(default = "default_disk_alert")]
    pub disk_alert: Option<f64>,
    /// Directory for snapshot dumps (current directory when unset)
    #[serde(default)]
    pub dump_dir: Option<String>,
}

fn default_interval_ms() -> u64 {
    DEFAULT_INTERVAL_MS
}

fn default_fast_interval_ms() -> u64 {
    DEFAULT_FAST_INTERVAL_MS
}

fn default_battery_alert_min() -> f64 {
    35.0
}

fn default_battery_alert_max() -> f64 {
    95.0
}

fn default_temperature_alert() -> Option<f64> {
    Some(90.0)
}

fn default_memory_alert() -> Option<f64> {
    Some(95.0)
}

fn default_disk_alert() -> Option<f64> {
    Some(95.0)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            fast_interval_ms: default_fast_interval_ms(),
            battery_alert_min: default_battery_alert_min(),
            battery_alert_max: default_battery_alert_max(),
            prefer_gpu_panel: false,
            temperature_alert: default_temperature_alert(),
            memory_alert: default_memory_alert(),
            disk_alert: default_disk_alert(),
            dump_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let data = fs::read(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        // If the file is empty or corrupted, return default config
        if data.is_empty() {
            return Ok(Config::default());
        }

        Ok(serde_json::from_slice(&data).unwrap_or_else(|e| {
            log::warn!("Ignoring unreadable config {:?}: {}", config_path, e);
            Config::default()
        }))
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let data = serde_json::to_vec_pretty(self).with_context(|| "Failed to serialize config")?;

        fs::write(config_path, data)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().with_context(|| "Could not determine config directory")?;

        Ok(config_dir.join("sensorboard").join("config.json"))
    }

    pub fn cadence(&self) -> Cadence {
        Cadence::new(self.interval_ms, self.fast_interval_ms)
    }

    pub fn alert_config(&self) -> AlertConfig {
        AlertConfig {
            battery_low: self.battery_alert_min,
            battery_high: self.battery_alert_max,
            temperature_high: self.temperature_alert,
            memory_high: self.memory_alert,
            disk_high: self.disk_alert,
        }
    }

    /// Update one field from its textual form. Alert thresholds accept
    /// `off` to disable them.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        fn threshold(value: &str) -> Result<Option<f64>> {
            if value.eq_ignore_ascii_case("off") {
                return Ok(None);
            }
            Ok(Some(value.parse::<f64>().with_context(|| {
                format!("Invalid threshold '{}'", value)
            })?))
        }

        match key {
            "interval_ms" => self.interval_ms = parse_field(key, value)?,
            "fast_interval_ms" => self.fast_interval_ms = parse_field(key, value)?,
            "battery_alert_min" => self.battery_alert_min = parse_field(key, value)?,
            "battery_alert_max" => self.battery_alert_max = parse_field(key, value)?,
            "prefer_gpu_panel" => self.prefer_gpu_panel = parse_field(key, value)?,
            "temperature_alert" => self.temperature_alert = threshold(value)?,
            "memory_alert" => self.memory_alert = threshold(value)?,
            "disk_alert" => self.disk_alert = threshold(value)?,
            "dump_dir" => self.dump_dir = Some(value.to_string()),
            _ => anyhow::bail!("Unknown config key '{}'", key),
        }

        if self.battery_alert_min >= self.battery_alert_max {
            anyhow::bail!(
                "battery_alert_min ({}) must be below battery_alert_max ({})",
                self.battery_alert_min,
                self.battery_alert_max
            );
        }
        Ok(())
    }

    /// Directory where `dump` writes snapshot files
    pub fn dump_dir(&self) -> PathBuf {
        self.dump_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

fn parse_field<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse::<T>()
        .with_context(|| format!("Invalid value '{}' for {}", value, key))
}
