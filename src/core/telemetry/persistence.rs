//! On-demand JSON dump of the current sensor snapshot.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use log::info;
use serde_json::Value;

use super::registry::MetricRegistry;
use super::sensor::PowerStatus;
use crate::error::Result;

pub const RECORDED_KEY: &str = "recorded";
pub const BATTERY_STATUS_KEY: &str = "Battery Status (all)";

fn date_stamp(at: &DateTime<Local>) -> String {
    at.format("%Y_%m_%d").to_string()
}

/// `<YYYY_MM_DD>_dump.json`
pub fn dump_file_name(at: &DateTime<Local>) -> String {
    format!("{}_dump.json", date_stamp(at))
}

/// Nested map of the snapshot plus the recording time and battery list.
pub fn dump_document(
    registry: &MetricRegistry,
    power: Option<&PowerStatus>,
    at: &DateTime<Local>,
) -> Value {
    let mut document = match registry.to_nested_map() {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };

    document.insert(
        RECORDED_KEY.to_string(),
        Value::String(date_stamp(at)),
    );
    let battery = match power {
        Some(status) => serde_json::to_value(status.to_list()).unwrap_or(Value::Null),
        None => Value::Null,
    };
    document.insert(BATTERY_STATUS_KEY.to_string(), battery);

    Value::Object(document)
}

/// Writes the dump into `dir`, creating it if needed. A second dump on the
/// same day overwrites the first.
pub fn write_dump(
    registry: &MetricRegistry,
    power: Option<&PowerStatus>,
    dir: &Path,
    at: &DateTime<Local>,
) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let path = dir.join(dump_file_name(at));
    let content = serde_json::to_string_pretty(&dump_document(registry, power, at))?;
    fs::write(&path, content)?;

    info!("Snapshot written to {}", path.display());
    Ok(path)
}
