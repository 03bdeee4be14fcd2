//! One refresh cycle: collect, fill the table, record history, color, alert.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Local;
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::Value;

use super::alerts::{Alert, AlertConfig, AlertLatches, AlertSeverity};
use super::classify::{classify, Color};
use super::history::HistoryBuffer;
use super::persistence::write_dump;
use super::rate::{CounterSource, RateReading, RateTracker};
use super::registry::MetricRegistry;
use super::sensor::{
    build_registry, NotificationSink, PowerStatus, Reading, SensorProvider, SystemProbe,
};
use super::table::{shapes_layout, DisplayTable, RowSource, CPU_TEMP, MEMORY_USAGE};
use super::value::Scalar;
use crate::error::Result;

/// Knobs that shape the table and the alert thresholds.
#[derive(Debug, Clone, Default)]
pub struct OrchestratorOptions {
    pub alerts: AlertConfig,
    pub prefer_gpu_panel: bool,
}

/// One rendered table row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRow {
    pub id: usize,
    pub label: String,
    pub formatted_value: String,
    pub unit: String,
    pub color: Color,
    /// Row id of the group parent, for children only
    pub parent_group_id: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TickReport {
    pub tick: u64,
    pub rows: Vec<DisplayRow>,
    pub alerts: Vec<Alert>,
    pub elapsed_ms: f64,
}

/// Everything gathered from the collaborators for one tick.
struct Sample {
    /// False when the provider failed and `readings` is empty as a result
    polled: bool,
    readings: Vec<Reading>,
    by_id: HashMap<String, usize>,
    power: Option<PowerStatus>,
    disk: Option<f64>,
    processes: Option<usize>,
    rate: RateReading,
}

impl Sample {
    fn collect(
        provider: &mut dyn SensorProvider,
        probe: &mut dyn SystemProbe,
        network: &mut RateTracker,
    ) -> Self {
        // A failed poll degrades every sensor row instead of aborting the tick
        let (polled, readings) = match provider.poll() {
            Ok(readings) => (true, readings),
            Err(e) => {
                warn!("Sensor poll failed: {}", e);
                (false, Vec::new())
            }
        };
        let by_id = readings
            .iter()
            .enumerate()
            .map(|(i, r)| (r.identifier.clone(), i))
            .collect();

        Self {
            polled,
            readings,
            by_id,
            power: probe.power_status(),
            disk: probe.disk_usage(),
            processes: probe.process_count(),
            rate: network.poll(),
        }
    }

    fn reading(&self, identifier: &str) -> Option<&Reading> {
        self.by_id.get(identifier).map(|&i| &self.readings[i])
    }

    /// Current value of a row plus the upper bound used for scaled colors.
    fn resolve(&self, source: &RowSource) -> (Scalar, Option<f64>) {
        match source {
            RowSource::Sensor(identifier) => match self.reading(identifier) {
                Some(reading) => (reading.scalar(), reading.max.map(f64::from)),
                None => (Scalar::Unavailable, None),
            },
            RowSource::AcStatus => (
                self.power
                    .map(|p| Scalar::from(p.ac.as_str()))
                    .unwrap_or(Scalar::Unavailable),
                None,
            ),
            RowSource::BatteryPercent => (
                self.power
                    .map(|p| Scalar::Float(p.percent))
                    .unwrap_or(Scalar::Unavailable),
                None,
            ),
            RowSource::BatteryStatus => (
                self.power
                    .map(|p| Scalar::from(p.charge.as_str()))
                    .unwrap_or(Scalar::Unavailable),
                None,
            ),
            RowSource::DiskUsage => (
                self.disk.map(Scalar::Float).unwrap_or(Scalar::Unavailable),
                None,
            ),
            RowSource::ProcessCount => (
                self.processes
                    .map(Scalar::from)
                    .unwrap_or(Scalar::Unavailable),
                None,
            ),
            RowSource::NetworkSent => (self.rate.sent(), None),
            RowSource::NetworkReceived => (self.rate.received(), None),
            RowSource::Missing => (Scalar::Unavailable, None),
        }
    }
}

pub struct Orchestrator {
    provider: Box<dyn SensorProvider>,
    probe: Box<dyn SystemProbe>,
    network: RateTracker,
    sink: Box<dyn NotificationSink>,
    table: DisplayTable,
    /// Every reading the table has placed a row for so far
    layout: Vec<Reading>,
    prefer_gpu_panel: bool,
    histories: Vec<HistoryBuffer>,
    latches: AlertLatches,
    last_registry: MetricRegistry,
    last_power: Option<PowerStatus>,
    ticks: u64,
}

impl Orchestrator {
    /// Takes an initial sample to lay out the table and seed every history
    /// buffer. Later ticks extend the layout when new sensors appear.
    pub fn new(
        mut provider: Box<dyn SensorProvider>,
        mut probe: Box<dyn SystemProbe>,
        network: Box<dyn CounterSource>,
        sink: Box<dyn NotificationSink>,
        options: OrchestratorOptions,
    ) -> Self {
        let mut network = RateTracker::new(network);
        let sample = Sample::collect(provider.as_mut(), probe.as_mut(), &mut network);

        let layout: Vec<Reading> = sample
            .readings
            .iter()
            .filter(|r| shapes_layout(r))
            .cloned()
            .collect();
        let table = DisplayTable::build(&layout, sample.power.as_ref(), options.prefer_gpu_panel);
        let histories = table
            .rows
            .iter()
            .map(|row| HistoryBuffer::new(&sample.resolve(&row.source).0, row.is_percentage_range()))
            .collect();
        info!(
            "Dashboard ready with {} rows ({:?} panel)",
            table.len(),
            table.mode
        );

        Self {
            provider,
            probe,
            network,
            sink,
            table,
            layout,
            prefer_gpu_panel: options.prefer_gpu_panel,
            histories,
            latches: AlertLatches::new(options.alerts),
            last_registry: build_registry(&sample.readings),
            last_power: sample.power,
            ticks: 0,
        }
    }

    pub fn tick(&mut self) -> TickReport {
        let started = Instant::now();
        let sample = Sample::collect(self.provider.as_mut(), self.probe.as_mut(), &mut self.network);
        self.extend_layout(&sample);

        let mut values = Vec::with_capacity(self.table.len());
        let mut rows = Vec::with_capacity(self.table.len());
        for (id, row) in self.table.rows.iter().enumerate() {
            let (value, bound) = sample.resolve(&row.source);
            self.histories[id].append(&value);
            rows.push(DisplayRow {
                id,
                label: row.name.name.clone(),
                formatted_value: value.to_string(),
                unit: row.name.unit.clone(),
                color: classify(row.class, &value, bound),
                parent_group_id: row.parent,
            });
            values.push(value);
        }

        let alerts = self.evaluate_alerts(&sample, &values);
        for alert in &alerts {
            match alert.severity {
                AlertSeverity::Info => info!("{}", alert.message),
                _ => warn!("{}", alert.message),
            }
            self.sink.notify(&alert.message);
        }

        self.last_registry = build_registry(&sample.readings);
        self.last_power = sample.power;
        self.ticks += 1;

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        debug!("Tick {} took {:.2} ms", self.ticks, elapsed_ms);
        TickReport {
            tick: self.ticks,
            rows,
            alerts,
            elapsed_ms,
        }
    }

    /// Rebuilds the table when a successful poll reports a sensor the layout
    /// has not seen. Sensors that vanish keep their rows. Rows whose source
    /// survives the rebuild keep their history.
    fn extend_layout(&mut self, sample: &Sample) {
        if !sample.polled {
            return;
        }
        let fresh: Vec<Reading> = sample
            .readings
            .iter()
            .filter(|r| shapes_layout(r))
            .filter(|r| !self.layout.iter().any(|known| known.identifier == r.identifier))
            .cloned()
            .collect();
        if fresh.is_empty() {
            return;
        }

        info!("{} new sensor(s) reported, rebuilding the dashboard", fresh.len());
        self.layout.extend(fresh);
        let power = sample.power.as_ref().or(self.last_power.as_ref());
        let table = DisplayTable::build(&self.layout, power, self.prefer_gpu_panel);

        let mut previous: Vec<(RowSource, HistoryBuffer)> = self
            .table
            .rows
            .iter()
            .map(|row| row.source.clone())
            .zip(self.histories.drain(..))
            .filter(|(source, _)| *source != RowSource::Missing)
            .collect();
        self.histories = table
            .rows
            .iter()
            .map(|row| {
                match previous.iter().position(|(source, _)| *source == row.source) {
                    Some(i) => previous.swap_remove(i).1,
                    None => HistoryBuffer::new(&sample.resolve(&row.source).0, row.is_percentage_range()),
                }
            })
            .collect();
        self.table = table;
    }

    fn evaluate_alerts(&mut self, sample: &Sample, values: &[Scalar]) -> Vec<Alert> {
        let row_value = |label: &str| {
            self.table
                .rows
                .iter()
                .position(|r| r.name.is_name(label))
                .and_then(|i| values[i].as_f64())
        };
        let temperature = row_value(CPU_TEMP);
        let memory = row_value(MEMORY_USAGE);

        let mut alerts = Vec::new();
        if let Some(power) = sample.power.filter(|p| p.charge.has_battery()) {
            alerts.extend(self.latches.battery(power.percent, power.is_charging()));
        }
        if let Some(celsius) = temperature {
            alerts.extend(self.latches.temperature(CPU_TEMP, celsius));
        }
        if let Some(percent) = memory {
            alerts.extend(self.latches.memory(percent));
        }
        if let Some(percent) = sample.disk {
            alerts.extend(self.latches.disk(percent));
        }
        alerts
    }

    /// Writes the latest snapshot into `dir` and tells the sink how it went.
    pub fn dump(&mut self, dir: &Path) -> Result<PathBuf> {
        let outcome = write_dump(&self.last_registry, self.last_power.as_ref(), dir, &Local::now());
        if let Err(e) = &outcome {
            warn!("Dump to {} failed: {}", dir.display(), e);
        }
        self.sink.notify(&dump_notice(dir, &outcome));
        outcome
    }

    /// Nested-map view of the latest snapshot.
    pub fn snapshot(&self) -> Value {
        self.last_registry.to_nested_map()
    }

    pub fn registry(&self) -> &MetricRegistry {
        &self.last_registry
    }

    pub fn table(&self) -> &DisplayTable {
        &self.table
    }

    pub fn history(&self, row: usize) -> Option<&HistoryBuffer> {
        self.histories.get(row)
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Drop the current network adapter; the next tick looks for a new one.
    pub fn force_rediscover(&mut self) {
        self.network.force_rediscover();
    }
}

/// Message for the notification sink after a dump attempt.
fn dump_notice(dir: &Path, outcome: &Result<PathBuf>) -> String {
    match outcome {
        Ok(path) => format!("Sensor data saved to {}", path.display()),
        Err(e) if e.is_permission_denied() => {
            format!("Permission denied: cannot write to {}", dir.display())
        }
        Err(e) => format!("Failed to save sensor data: {}", e),
    }
}
