//! Readings and the collaborator interfaces that supply them.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::registry::{MetricRegistry, RawValue};
use super::value::Scalar;
use crate::error::Result;

/// Sensor category, which also fixes the reading's unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SensorKind {
    Voltage,
    Clock,
    Temperature,
    Load,
    Fan,
    Flow,
    Control,
    Level,
    Factor,
    Power,
    Data,
    SmallData,
    Throughput,
}

impl SensorKind {
    pub fn unit(&self) -> &'static str {
        match self {
            SensorKind::Voltage => "V",
            SensorKind::Clock => "MHz",
            SensorKind::Temperature => "°C",
            SensorKind::Load | SensorKind::Control | SensorKind::Level => "%",
            SensorKind::Fan => "RPM",
            SensorKind::Flow => "L/h",
            SensorKind::Factor => "",
            SensorKind::Power => "W",
            SensorKind::Data => "GB",
            SensorKind::SmallData | SensorKind::Throughput => "MB",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SensorKind::Voltage => "Voltage",
            SensorKind::Clock => "Clock",
            SensorKind::Temperature => "Temperature",
            SensorKind::Load => "Load",
            SensorKind::Fan => "Fan",
            SensorKind::Flow => "Flow",
            SensorKind::Control => "Control",
            SensorKind::Level => "Level",
            SensorKind::Factor => "Factor",
            SensorKind::Power => "Power",
            SensorKind::Data => "Data",
            SensorKind::SmallData => "SmallData",
            SensorKind::Throughput => "Throughput",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HardwareKind {
    Mainboard,
    SuperIo,
    Cpu,
    Ram,
    GpuNvidia,
    GpuAti,
    TBalancer,
    HeatMaster,
    Hdd,
}

impl HardwareKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HardwareKind::Mainboard => "MainBoard",
            HardwareKind::SuperIo => "SuperIO",
            HardwareKind::Cpu => "CPU",
            HardwareKind::Ram => "RAM",
            HardwareKind::GpuNvidia => "GpuNvidia",
            HardwareKind::GpuAti => "GpuAti",
            HardwareKind::TBalancer => "TBalancer",
            HardwareKind::HeatMaster => "HeatMaster",
            HardwareKind::Hdd => "HDD",
        }
    }

    pub fn is_gpu(&self) -> bool {
        matches!(self, HardwareKind::GpuNvidia | HardwareKind::GpuAti)
    }
}

impl fmt::Display for HardwareKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One sensor value as delivered by the provider.
///
/// `identifier` is the only handle that stays stable across polls; `index`
/// is the provider's ordering key inside one piece of hardware.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub identifier: String,
    pub hardware: HardwareKind,
    pub hardware_name: String,
    pub category: SensorKind,
    pub name: String,
    pub index: u32,
    /// `None` when the sensor could not be read this tick
    pub value: Option<f32>,
    pub min: Option<f32>,
    pub max: Option<f32>,
}

impl Reading {
    pub fn unit(&self) -> &'static str {
        self.category.unit()
    }

    pub fn scalar(&self) -> Scalar {
        Scalar::from_reading(self.value)
    }

    fn to_registry(&self) -> MetricRegistry {
        let mut fields = MetricRegistry::new();
        fields.register("index", self.index);
        fields.register("name", self.name.as_str());
        fields.register("type", self.category.as_str());
        fields.register("identifier", self.identifier.as_str());
        fields.register("value", Scalar::from_reading(self.value));
        fields.register("min", Scalar::from_reading(self.min));
        fields.register("max", Scalar::from_reading(self.max));
        fields.register("format", self.unit());
        fields
    }
}

/// Mains power state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcStatus {
    Online,
    Offline,
    Unknown,
}

impl AcStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AcStatus::Online => "Online",
            AcStatus::Offline => "Offline",
            AcStatus::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargeStatus {
    High,
    Low,
    Critical,
    Charging,
    ChargingHigh,
    ChargingLow,
    ChargingCritical,
    NoSystemBattery,
    Uncharged,
    Unknown,
}

impl ChargeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChargeStatus::High => "High",
            ChargeStatus::Low => "Low",
            ChargeStatus::Critical => "Critical",
            ChargeStatus::Charging => "Charging",
            ChargeStatus::ChargingHigh => "Charging(High)",
            ChargeStatus::ChargingLow => "Charging(Low)",
            ChargeStatus::ChargingCritical => "Charging(Critical)",
            ChargeStatus::NoSystemBattery => "NoSystemBattery",
            ChargeStatus::Uncharged => "Uncharged",
            ChargeStatus::Unknown => "Unknown",
        }
    }

    pub fn has_battery(&self) -> bool {
        !matches!(self, ChargeStatus::NoSystemBattery | ChargeStatus::Unknown)
    }
}

/// Battery and mains state for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerStatus {
    pub ac: AcStatus,
    /// Remaining charge, 0-100
    pub percent: f64,
    pub charge: ChargeStatus,
}

impl PowerStatus {
    pub fn is_charging(&self) -> bool {
        self.ac == AcStatus::Online
    }

    /// Values in the order the battery panel shows them.
    pub fn to_list(&self) -> Vec<Scalar> {
        vec![
            Scalar::from(self.ac.as_str()),
            Scalar::Float(self.percent),
            Scalar::from(self.charge.as_str()),
        ]
    }
}

/// Supplies raw hardware sensor readings.
pub trait SensorProvider {
    /// One snapshot of every sensor. Per-sensor failures come back as
    /// readings with `value: None`; an `Err` means the whole poll failed.
    fn poll(&mut self) -> Result<Vec<Reading>>;
}

/// OS-level figures that are not hardware sensors.
pub trait SystemProbe {
    /// Used space of the system disk, 0-100
    fn disk_usage(&mut self) -> Option<f64>;
    fn process_count(&mut self) -> Option<usize>;
    fn power_status(&mut self) -> Option<PowerStatus>;
}

/// Receives user-facing notifications (toasts in a desktop shell).
pub trait NotificationSink {
    fn notify(&mut self, message: &str);
}

/// Sorts readings into the canonical order: hardware, then category, then
/// ascending provider index. Stable, so ties keep the provider's order.
pub fn canonical_order(readings: &mut [Reading]) {
    readings.sort_by_key(|r| (r.hardware, r.category, r.index));
}

/// Builds the tick's registry: one nested registry per piece of hardware
/// holding its name, the number of sensor categories, then one sequence of
/// sensor records per category.
pub fn build_registry(readings: &[Reading]) -> MetricRegistry {
    let mut sorted = readings.to_vec();
    canonical_order(&mut sorted);

    // Group by (hardware kind, hardware name), keeping first-seen order
    let mut hardware: Vec<((HardwareKind, String), Vec<&Reading>)> = Vec::new();
    for reading in &sorted {
        let key = (reading.hardware, reading.hardware_name.clone());
        match hardware.iter_mut().find(|(k, _)| *k == key) {
            Some((_, list)) => list.push(reading),
            None => hardware.push((key, vec![reading])),
        }
    }

    let mut registry = MetricRegistry::new();
    for ((kind, name), list) in hardware {
        let mut categories: Vec<(SensorKind, Vec<MetricRegistry>)> = Vec::new();
        for reading in list {
            let record = reading.to_registry();
            match categories.iter_mut().find(|(c, _)| *c == reading.category) {
                Some((_, records)) => records.push(record),
                None => categories.push((reading.category, vec![record])),
            }
        }

        let mut hw = MetricRegistry::new();
        hw.register("name", name.as_str());
        hw.register("size", categories.len());
        for (category, records) in categories {
            hw.register(category.as_str(), RawValue::from(records));
        }
        registry.register(kind.as_str(), hw);
    }
    registry
}
