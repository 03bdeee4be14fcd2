//! Row layout of the dashboard. Rebuilt only when a sensor it places
//! shows up for the first time.

use log::debug;
use serde::Serialize;

use super::classify::MetricClass;
use super::group::{SensorGroup, SensorName};
use super::sensor::{canonical_order, HardwareKind, PowerStatus, Reading, SensorKind};

pub const AC_STATUS: &str = "AC Status";
pub const BATTERY: &str = "Battery";
pub const BATTERY_STATUS: &str = "Battery Status";

pub const GPU_FAN: &str = "GPU Fan";
pub const GPU_POWER: &str = "GPU Power";
pub const GPU_TEMP: &str = "GPU Temperature";
pub const GPU_LOAD: &str = "GPU Usage";

pub const CPU_TEMP: &str = "CPU Temperature";
pub const CPU_LOAD: &str = "CPU Usage";
pub const CPU_CLOCK: &str = "CPU Clock";
pub const CPU_POWER: &str = "CPU Power";

pub const DISK_USAGE: &str = "Disk Usage";
pub const MEMORY_USAGE: &str = "Memory Usage";
pub const RUN_PID: &str = "Running Processes";
pub const NET_SENT: &str = "Network Sent";
pub const NET_RECV: &str = "Network Received";

const CPU_GROUPS: [(SensorKind, &str); 4] = [
    (SensorKind::Temperature, CPU_TEMP),
    (SensorKind::Load, CPU_LOAD),
    (SensorKind::Clock, CPU_CLOCK),
    (SensorKind::Power, CPU_POWER),
];

/// Readings the layout places rows for: CPU groups, the GPU panel and the
/// memory row. Everything else is read by identifier or not shown.
pub fn shapes_layout(reading: &Reading) -> bool {
    reading.hardware == HardwareKind::Cpu
        || reading.hardware.is_gpu()
        || (reading.hardware == HardwareKind::Ram && reading.category == SensorKind::Load)
}

/// Where a row's value comes from each tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RowSource {
    /// Provider reading with this identifier
    Sensor(String),
    AcStatus,
    BatteryPercent,
    BatteryStatus,
    DiskUsage,
    ProcessCount,
    NetworkSent,
    NetworkReceived,
    /// Nothing to read; always unavailable
    Missing,
}

/// Which extra panel sits above the CPU rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PanelMode {
    Battery,
    Gpu,
    None,
}

impl PanelMode {
    pub fn select(has_battery: bool, has_gpu: bool, prefer_gpu: bool) -> Self {
        match (has_battery, has_gpu) {
            (true, true) if prefer_gpu => PanelMode::Gpu,
            (true, _) => PanelMode::Battery,
            (false, true) => PanelMode::Gpu,
            (false, false) => PanelMode::None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TableRow {
    pub name: SensorName,
    pub source: RowSource,
    pub class: MetricClass,
    /// Row index of the group parent this row nests under
    pub parent: Option<usize>,
}

impl TableRow {
    fn new(name: SensorName, source: RowSource, class: MetricClass) -> Self {
        Self {
            name,
            source,
            class,
            parent: None,
        }
    }

    /// Percent and temperature rows chart on a fixed 0-100 axis.
    pub fn is_percentage_range(&self) -> bool {
        self.name.unit == "%" || self.name.unit == "°C"
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DisplayTable {
    pub mode: PanelMode,
    pub rows: Vec<TableRow>,
    pub groups: Vec<SensorGroup>,
}

impl DisplayTable {
    pub fn build(readings: &[Reading], power: Option<&PowerStatus>, prefer_gpu: bool) -> Self {
        let mut sorted = readings.to_vec();
        canonical_order(&mut sorted);

        let has_battery = power.is_some_and(|p| p.charge.has_battery());
        let has_gpu = sorted.iter().any(|r| r.hardware.is_gpu());
        let mode = PanelMode::select(has_battery, has_gpu, prefer_gpu);
        debug!("Building display table in {:?} mode", mode);

        let mut table = Self {
            mode,
            rows: Vec::new(),
            groups: Vec::new(),
        };

        match mode {
            PanelMode::Battery => table.push_battery_rows(),
            PanelMode::Gpu => table.push_gpu_rows(&sorted),
            PanelMode::None => {}
        }
        table.push_cpu_groups(&sorted);
        table.push_system_rows(&sorted);
        table
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.name.name.as_str()).collect()
    }

    pub fn group(&self, label: &str) -> Option<&SensorGroup> {
        self.groups.iter().find(|g| g.parent_name() == label)
    }

    fn push_battery_rows(&mut self) {
        self.rows.push(TableRow::new(
            SensorName::new(AC_STATUS).with_tag("ac"),
            RowSource::AcStatus,
            MetricClass::AcStatus,
        ));
        self.rows.push(TableRow::new(
            SensorName::new(BATTERY).with_tag("ac").with_unit("%"),
            RowSource::BatteryPercent,
            MetricClass::Battery,
        ));
        self.rows.push(TableRow::new(
            SensorName::new(BATTERY_STATUS).with_tag("ac"),
            RowSource::BatteryStatus,
            MetricClass::BatteryStatus,
        ));
    }

    fn push_gpu_rows(&mut self, sorted: &[Reading]) {
        let Some(gpu) = sorted.iter().find(|r| r.hardware.is_gpu()) else {
            return;
        };
        let gpu_kind: HardwareKind = gpu.hardware;
        let first = |category: SensorKind| {
            sorted
                .iter()
                .find(|r| r.hardware == gpu_kind && r.category == category)
        };

        let wanted = [
            (SensorKind::Fan, GPU_FAN, MetricClass::Fan),
            (SensorKind::Power, GPU_POWER, MetricClass::Power),
            (SensorKind::Temperature, GPU_TEMP, MetricClass::Temperature),
            (SensorKind::Load, GPU_LOAD, MetricClass::Load),
        ];
        for (category, label, class) in wanted {
            if let Some(reading) = first(category) {
                let mut name = SensorName::from_reading(reading);
                name.name = label.to_string();
                name.tag = Some("gpu".to_string());
                self.rows.push(TableRow::new(
                    name,
                    RowSource::Sensor(reading.identifier.clone()),
                    class,
                ));
            }
        }
    }

    fn push_cpu_groups(&mut self, sorted: &[Reading]) {
        for (category, label) in CPU_GROUPS {
            let members: Vec<Reading> = sorted
                .iter()
                .filter(|r| r.hardware == HardwareKind::Cpu && r.category == category)
                .cloned()
                .collect();

            // Absent categories simply produce no rows
            let Ok(group) = SensorGroup::new(&members, Some(label)) else {
                continue;
            };

            let class = match category {
                SensorKind::Temperature => MetricClass::Temperature,
                SensorKind::Load => MetricClass::Load,
                SensorKind::Power => MetricClass::Power,
                _ => MetricClass::Plain,
            };

            let parent_row = self.rows.len();
            for (position, name) in group.names().into_iter().enumerate() {
                let source = name
                    .identifier
                    .clone()
                    .map(RowSource::Sensor)
                    .unwrap_or(RowSource::Missing);
                let mut row = TableRow::new(name.clone(), source, class);
                if position > 0 {
                    row.parent = Some(parent_row);
                }
                self.rows.push(row);
            }
            self.groups.push(group);
        }
    }

    fn push_system_rows(&mut self, sorted: &[Reading]) {
        let memory_source = sorted
            .iter()
            .find(|r| r.hardware == HardwareKind::Ram && r.category == SensorKind::Load)
            .map(|r| RowSource::Sensor(r.identifier.clone()))
            .unwrap_or(RowSource::Missing);

        self.rows.push(TableRow::new(
            SensorName::new(DISK_USAGE).with_tag("system").with_unit("%"),
            RowSource::DiskUsage,
            MetricClass::Utilisation,
        ));
        self.rows.push(TableRow::new(
            SensorName::new(MEMORY_USAGE).with_tag("system").with_unit("%"),
            memory_source,
            MetricClass::Utilisation,
        ));
        self.rows.push(TableRow::new(
            SensorName::new(RUN_PID),
            RowSource::ProcessCount,
            MetricClass::Plain,
        ));
        self.rows.push(TableRow::new(
            SensorName::new(NET_SENT).with_tag("network").with_unit("KB/s"),
            RowSource::NetworkSent,
            MetricClass::Plain,
        ));
        self.rows.push(TableRow::new(
            SensorName::new(NET_RECV).with_tag("network").with_unit("KB/s"),
            RowSource::NetworkReceived,
            MetricClass::Plain,
        ));
    }
}
