// End-to-end ticks through the orchestrator with scripted collaborators

use std::fs;

use tempfile::TempDir;

use super::common::{reading, Harness};
use sensorboard::core::telemetry::classify::{GREEN, NEUTRAL, YELLOW};
use sensorboard::core::telemetry::{
    Cadence, HardwareKind, OrchestratorOptions, PanelMode, Scheduler, SensorKind,
};

const LAPTOP_LABELS: [&str; 13] = [
    "AC Status",
    "Battery",
    "Battery Status",
    "CPU Temperature",
    "CPU Usage",
    "CPU Core #1",
    "CPU Core #2",
    "CPU Clock",
    "Disk Usage",
    "Memory Usage",
    "Running Processes",
    "Network Sent",
    "Network Received",
];

#[test]
fn test_laptop_dashboard_layout_and_values() {
    let harness = Harness::laptop();
    let mut orch = harness.build();
    assert_eq!(orch.table().mode, PanelMode::Battery);

    let report = orch.tick();
    let labels: Vec<&str> = report.rows.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, LAPTOP_LABELS);

    assert_eq!(report.rows[0].formatted_value, "Offline");
    assert_eq!(report.rows[0].color, YELLOW);
    assert_eq!(report.rows[1].formatted_value, "80.0");
    assert_eq!(report.rows[1].unit, "%");
    assert_eq!(report.rows[2].color, GREEN);

    // Group parent carries the total, children nest under it
    assert_eq!(report.rows[4].formatted_value, "20.0");
    assert_eq!(report.rows[4].parent_group_id, None);
    assert_eq!(report.rows[5].formatted_value, "10.0");
    assert_eq!(report.rows[5].parent_group_id, Some(4));
    assert_eq!(report.rows[6].parent_group_id, Some(4));

    assert_eq!(report.rows[7].unit, "MHz");
    assert_eq!(report.rows[7].color, NEUTRAL);
    assert_eq!(report.rows[9].formatted_value, "48.0");
    assert_eq!(report.rows[10].formatted_value, "210");
    assert_eq!(report.rows[11].formatted_value, "Not connected");
    assert_eq!(report.rows[12].unit, "KB/s");
}

#[test]
fn test_row_order_survives_provider_reordering() {
    let harness = Harness::laptop();
    let mut orch = harness.build();
    let first: Vec<String> = orch.tick().rows.into_iter().map(|r| r.label).collect();

    harness.provider.readings.borrow_mut().reverse();
    harness.provider.set_value("/cpu/load/1", Some(99.0));
    let report = orch.tick();

    let second: Vec<String> = report.rows.iter().map(|r| r.label.clone()).collect();
    assert_eq!(first, second);
    assert_eq!(report.rows[5].formatted_value, "99.0");
}

#[test]
fn test_vanished_sensor_shows_unavailable() {
    let harness = Harness::laptop();
    let mut orch = harness.build();

    harness
        .provider
        .readings
        .borrow_mut()
        .retain(|r| r.identifier != "/cpu/clock/0");
    harness.provider.set_value("/cpu/temperature/0", None);
    let report = orch.tick();

    assert_eq!(report.rows[7].label, "CPU Clock");
    assert_eq!(report.rows[7].formatted_value, "N/A");
    assert_eq!(report.rows[3].formatted_value, "N/A");
    assert_eq!(report.rows[3].color, NEUTRAL);
}

#[test]
fn test_provider_failure_then_recovery() {
    let harness = Harness::laptop();
    let mut orch = harness.build();

    *harness.provider.fail.borrow_mut() = true;
    let failed = orch.tick();
    assert_eq!(failed.rows.len(), LAPTOP_LABELS.len());
    assert_eq!(failed.rows[4].formatted_value, "N/A");
    // Rows that do not depend on the provider keep working
    assert_eq!(failed.rows[1].formatted_value, "80.0");
    assert_eq!(failed.rows[8].formatted_value, "40.0");

    *harness.provider.fail.borrow_mut() = false;
    let recovered = orch.tick();
    assert_eq!(recovered.rows[4].formatted_value, "20.0");
}

#[test]
fn test_failed_startup_poll_recovers_cpu_rows() {
    let harness = Harness::laptop();
    *harness.provider.fail.borrow_mut() = true;
    let mut orch = harness.build();
    assert!(orch.table().group("CPU Usage").is_none());

    // Still failing: the layout stays as it is
    let degraded = orch.tick();
    assert_eq!(degraded.rows.len(), 8);
    assert_eq!(degraded.rows[4].label, "Memory Usage");
    assert_eq!(degraded.rows[4].formatted_value, "N/A");

    *harness.provider.fail.borrow_mut() = false;
    let recovered = orch.tick();
    let labels: Vec<&str> = recovered.rows.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, LAPTOP_LABELS);
    assert_eq!(recovered.rows[4].formatted_value, "20.0");
    assert_eq!(recovered.rows[9].formatted_value, "48.0");
    assert!(orch.table().group("CPU Usage").unwrap().is_children("/cpu/load/2"));

    // Battery history predates the rebuild and was kept
    let battery = orch.history(1).unwrap();
    let tail: Vec<f64> = battery.values().iter().rev().take(3).copied().collect();
    assert_eq!(tail, vec![80.0, 80.0, 80.0]);
}

#[test]
fn test_sensor_category_appearing_after_startup() {
    let harness = Harness::laptop();
    let mut orch = harness.build();
    for value in [11.0, 12.0] {
        harness.provider.set_value("/cpu/load/0", Some(value));
        orch.tick();
    }

    harness
        .provider
        .readings
        .borrow_mut()
        .push(reading(HardwareKind::Cpu, SensorKind::Power, 0, "CPU Package", 15.5));
    let report = orch.tick();

    let power = report.rows.iter().position(|r| r.label == "CPU Power").unwrap();
    assert_eq!(power, 8);
    assert_eq!(report.rows[power].formatted_value, "15.5");
    assert_eq!(report.rows[power].unit, "W");
    assert_eq!(report.rows.len(), LAPTOP_LABELS.len() + 1);

    // CPU Usage kept its samples across the rebuild
    let usage = orch.history(4).unwrap();
    let tail: Vec<f64> = usage.values().iter().rev().take(3).copied().collect();
    assert_eq!(tail, vec![12.0, 12.0, 11.0]);
}

#[test]
fn test_network_rates_through_pipeline() {
    let harness = Harness::laptop();
    *harness.network.connected.borrow_mut() = true;
    harness.network.push(10_000, 50_000); // bootstrap during startup
    harness.network.push(10_000 + 2048, 50_000 + 1024);
    harness.network.push(10_000 + 2048, 50_000 + 1024);

    let mut orch = harness.build();

    let report = orch.tick();
    assert_eq!(report.rows[11].formatted_value, "2.0");
    assert_eq!(report.rows[12].formatted_value, "1.0");

    // Counters did not move
    let idle = orch.tick();
    assert_eq!(idle.rows[11].formatted_value, "Not connected");
    assert_eq!(orch.history(11).unwrap().latest(), Some(0.0));
}

#[test]
fn test_history_tracks_every_row() {
    let harness = Harness::laptop();
    let mut orch = harness.build();
    for value in [1.0, 2.0, 3.0] {
        harness.provider.set_value("/cpu/load/0", Some(value));
        orch.tick();
    }

    let usage = orch.history(4).unwrap();
    assert_eq!(usage.len(), 30);
    let tail: Vec<f64> = usage.values().iter().rev().take(3).copied().collect();
    assert_eq!(tail, vec![3.0, 2.0, 1.0]);
    assert!(usage.is_percentage_range);

    assert!(!orch.history(0).unwrap().is_chartable());
    assert!(orch.history(LAPTOP_LABELS.len()).is_none());
}

#[test]
fn test_gpu_panel_preference() {
    let harness = Harness::laptop();
    harness.provider.readings.borrow_mut().extend([
        reading(HardwareKind::GpuNvidia, SensorKind::Load, 0, "GPU Core", 70.0),
        reading(HardwareKind::GpuNvidia, SensorKind::Temperature, 0, "GPU Core", 65.0),
    ]);

    let battery_first = harness.build();
    assert_eq!(battery_first.table().mode, PanelMode::Battery);

    let mut gpu_first = harness.build_with(OrchestratorOptions {
        prefer_gpu_panel: true,
        ..Default::default()
    });
    assert_eq!(gpu_first.table().mode, PanelMode::Gpu);
    let report = gpu_first.tick();
    assert_eq!(report.rows[0].label, "GPU Temperature");
    assert_eq!(report.rows[1].label, "GPU Usage");
    assert_eq!(report.rows[1].formatted_value, "70.0");
}

#[test]
fn test_snapshot_nested_map() {
    let harness = Harness::laptop();
    harness.provider.set_value("/cpu/clock/0", None);
    let mut orch = harness.build();
    orch.tick();

    let snapshot = orch.snapshot();
    assert_eq!(snapshot["CPU"]["name"], "Test CPU");
    assert_eq!(snapshot["CPU"]["size"], 3);
    assert_eq!(snapshot["CPU"]["Load"][0]["name"], "CPU Total");
    assert!(snapshot["CPU"]["Clock"][0]["value"].is_null());
    assert_eq!(snapshot["RAM"]["Load"][0]["format"], "%");
}

#[test]
fn test_scheduler_runs_requested_ticks() {
    let harness = Harness::laptop();
    let mut orch = harness.build();
    let mut seen = Vec::new();

    let mut scheduler = Scheduler::new(Cadence::new(1, 1)).with_max_ticks(Some(3));
    let ran = scheduler.run(&mut orch, |_, report| seen.push(report.tick));

    assert_eq!(ran, 3);
    assert_eq!(seen, vec![1, 2, 3]);
    assert_eq!(orch.ticks(), 3);
}

#[test]
fn test_scheduler_stopped_before_start() {
    let harness = Harness::laptop();
    let mut orch = harness.build();

    let mut scheduler = Scheduler::new(Cadence::default());
    scheduler.handle().stop();
    assert_eq!(scheduler.run(&mut orch, |_, _| {}), 0);
}

#[test]
fn test_scheduler_writes_requested_dump() {
    let temp = TempDir::new().unwrap();
    let harness = Harness::laptop();
    let mut orch = harness.build();

    let mut scheduler = Scheduler::new(Cadence::new(1, 1))
        .with_max_ticks(Some(2))
        .with_dump_dir(temp.path().to_path_buf());
    scheduler.handle().request_dump();
    scheduler.run(&mut orch, |_, _| {});

    let files: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
    assert_eq!(files.len(), 1);
    let messages = harness.inbox.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("Sensor data saved to"));
}

#[test]
fn test_scheduler_rediscover_restarts_rates() {
    let harness = Harness::laptop();
    *harness.network.connected.borrow_mut() = true;
    harness.network.push(10_000, 50_000); // bootstrap during startup
    harness.network.push(12_048, 51_024);
    let mut orch = harness.build();

    let mut scheduler = Scheduler::new(Cadence::new(1, 1)).with_max_ticks(Some(1));
    scheduler.handle().request_rediscover();
    let mut sent = Vec::new();
    scheduler.run(&mut orch, |_, report| sent.push(report.rows[11].formatted_value.clone()));

    // The dropped baseline means the first sample only re-primes the tracker
    assert_eq!(sent, vec!["Not connected"]);
}
