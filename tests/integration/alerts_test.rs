// Latched notifications as seen by the notification sink

use super::common::{on_battery, on_mains, Harness};
use sensorboard::core::telemetry::{AlertCategory, AlertConfig, OrchestratorOptions};

#[test]
fn test_discharge_sequence_notifies_twice() {
    let harness = Harness::laptop();
    let mut orch = harness.build();

    for percent in [40.0, 30.0, 20.0, 30.0, 40.0, 20.0] {
        *harness.probe.power.borrow_mut() = Some(on_battery(percent));
        orch.tick();
    }

    assert_eq!(
        harness.inbox.messages(),
        vec![
            "Battery at 30%. Connect the AC adapter.",
            "Battery at 20%. Connect the AC adapter.",
        ]
    );
}

#[test]
fn test_charged_notification_only_while_charging() {
    let harness = Harness::laptop();
    let mut orch = harness.build();

    *harness.probe.power.borrow_mut() = Some(on_battery(97.0));
    assert!(orch.tick().alerts.is_empty());

    *harness.probe.power.borrow_mut() = Some(on_mains(97.0));
    let report = orch.tick();
    assert_eq!(report.alerts.len(), 1);
    assert_eq!(report.alerts[0].category, AlertCategory::Battery);
    assert_eq!(harness.inbox.messages(), vec!["The PC is sufficiently charged."]);

    // Stays quiet while still full
    orch.tick();
    assert_eq!(harness.inbox.messages().len(), 1);
}

#[test]
fn test_desktop_without_battery_never_alerts_on_power() {
    let harness = Harness::laptop();
    *harness.probe.power.borrow_mut() = None;
    let mut orch = harness.build();

    for _ in 0..3 {
        orch.tick();
    }
    assert!(harness.inbox.messages().is_empty());
}

#[test]
fn test_memory_and_temperature_alerts() {
    let harness = Harness::laptop();
    let mut orch = harness.build();

    harness.provider.set_value("/ram/load/0", Some(97.0));
    harness.provider.set_value("/cpu/temperature/0", Some(93.0));
    let report = orch.tick();

    let categories: Vec<_> = report.alerts.iter().map(|a| a.category.clone()).collect();
    assert!(categories.contains(&AlertCategory::Memory));
    assert!(categories.contains(&AlertCategory::Temperature("CPU Temperature".into())));

    // Latched until the values drop back
    assert!(orch.tick().alerts.is_empty());
    harness.provider.set_value("/ram/load/0", Some(50.0));
    orch.tick();
    harness.provider.set_value("/ram/load/0", Some(97.0));
    let again = orch.tick();
    assert_eq!(again.alerts.len(), 1);
    assert_eq!(again.alerts[0].category, AlertCategory::Memory);
}

#[test]
fn test_custom_thresholds() {
    let harness = Harness::laptop();
    *harness.probe.disk.borrow_mut() = Some(85.0);
    let mut orch = harness.build_with(OrchestratorOptions {
        alerts: AlertConfig {
            battery_low: 50.0,
            disk_high: Some(80.0),
            ..Default::default()
        },
        prefer_gpu_panel: false,
    });

    *harness.probe.power.borrow_mut() = Some(on_battery(45.0));
    let report = orch.tick();
    let categories: Vec<_> = report.alerts.iter().map(|a| a.category.clone()).collect();
    assert_eq!(categories, vec![AlertCategory::Battery, AlertCategory::Disk]);
}
