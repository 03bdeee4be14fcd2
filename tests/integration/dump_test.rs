// Snapshot dumps written through the orchestrator

use std::fs;

use chrono::Local;
use serde_json::{json, Value};
use tempfile::TempDir;

use super::common::Harness;

#[test]
fn test_dump_writes_dated_file_and_notifies() {
    let temp = TempDir::new().unwrap();
    let harness = Harness::laptop();
    let mut orch = harness.build();
    orch.tick();

    let path = orch.dump(temp.path()).unwrap();
    let expected_name = format!("{}_dump.json", Local::now().format("%Y_%m_%d"));
    assert_eq!(path.file_name().unwrap().to_str().unwrap(), expected_name);

    let written: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written["CPU"]["Load"][0]["value"], 20.0);
    assert_eq!(written["Battery Status (all)"], json!(["Offline", 80.0, "High"]));
    assert!(written["recorded"].is_string());

    let messages = harness.inbox.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("Sensor data saved to"));
}

#[test]
fn test_dump_keeps_hardware_order() {
    let temp = TempDir::new().unwrap();
    let harness = Harness::laptop();
    let mut orch = harness.build();

    let path = orch.dump(temp.path()).unwrap();
    let text = fs::read_to_string(path).unwrap();
    let cpu = text.find("\"CPU\"").unwrap();
    let ram = text.find("\"RAM\"").unwrap();
    let recorded = text.find("\"recorded\"").unwrap();
    assert!(cpu < ram && ram < recorded);
}

#[test]
fn test_dump_failure_is_reported() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("not_a_dir");
    fs::write(&blocker, "occupied").unwrap();

    let harness = Harness::laptop();
    let mut orch = harness.build();

    assert!(orch.dump(&blocker).is_err());
    let messages = harness.inbox.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("Failed to save sensor data"));
}

#[test]
fn test_second_dump_same_day_overwrites() {
    let temp = TempDir::new().unwrap();
    let harness = Harness::laptop();
    let mut orch = harness.build();

    let first = orch.dump(temp.path()).unwrap();
    harness.provider.set_value("/cpu/load/0", Some(77.0));
    orch.tick();
    let second = orch.dump(temp.path()).unwrap();

    assert_eq!(first, second);
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
    let written: Value = serde_json::from_str(&fs::read_to_string(&second).unwrap()).unwrap();
    assert_eq!(written["CPU"]["Load"][0]["value"], 77.0);
}
