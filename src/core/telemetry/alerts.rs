//! Threshold alerting with one-shot latches.
//!
//! A latch fires once when a value crosses into its low or high band and
//! stays silent until the value returns to the neutral band in between.

use serde::{Deserialize, Serialize};

/// Alert configuration with thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertConfig {
    pub battery_low: f64,               // Notify at or below while discharging (%)
    pub battery_high: f64,              // Notify at or above while charging (%)
    pub temperature_high: Option<f64>,  // CPU package (°C)
    pub memory_high: Option<f64>,       // (%)
    pub disk_high: Option<f64>,         // (%)
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            battery_low: 35.0,
            battery_high: 95.0,
            temperature_high: Some(90.0),
            memory_high: Some(95.0),
            disk_high: Some(95.0),
        }
    }
}

/// An individual alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub severity: AlertSeverity,
    pub category: AlertCategory,
    pub message: String,
    pub value: f64,
    pub threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertCategory {
    Battery,
    Temperature(String), // Sensor name
    Memory,
    Disk,
}

/// Which band a value was just found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Crossing {
    Low,
    High,
}

/// Which directions may fire on this observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    LowOnly,
    HighOnly,
}

impl Gate {
    fn allows(&self, crossing: Crossing) -> bool {
        matches!(
            (self, crossing),
            (Gate::LowOnly, Crossing::Low) | (Gate::HighOnly, Crossing::High)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum LatchState {
    #[default]
    Neutral,
    Low,
    High,
}

/// One-shot latch over a bounded value.
///
/// Low band: `value <= low`. High band: `value >= high`. Anything strictly
/// between is neutral and re-arms both directions.
#[derive(Debug, Clone, Default)]
pub struct ThresholdLatch {
    low: Option<f64>,
    high: Option<f64>,
    state: LatchState,
}

impl ThresholdLatch {
    pub fn new(low: Option<f64>, high: Option<f64>) -> Self {
        Self {
            low,
            high,
            state: LatchState::Neutral,
        }
    }

    pub fn high_only(high: f64) -> Self {
        Self::new(None, Some(high))
    }

    /// Feed one value; returns the crossing if this observation fires.
    pub fn observe(&mut self, value: f64, gate: Gate) -> Option<Crossing> {
        let in_low = self.low.is_some_and(|low| value <= low);
        let in_high = self.high.is_some_and(|high| value >= high);

        if in_low && gate.allows(Crossing::Low) && self.state != LatchState::Low {
            self.state = LatchState::Low;
            return Some(Crossing::Low);
        }
        if in_high && gate.allows(Crossing::High) && self.state != LatchState::High {
            self.state = LatchState::High;
            return Some(Crossing::High);
        }
        if !in_low && !in_high {
            self.state = LatchState::Neutral;
        }
        None
    }

    pub fn is_latched(&self) -> bool {
        self.state != LatchState::Neutral
    }
}

/// All latches the dashboard keeps across ticks.
#[derive(Debug, Clone)]
pub struct AlertLatches {
    config: AlertConfig,
    battery: ThresholdLatch,
    temperature: Option<ThresholdLatch>,
    memory: Option<ThresholdLatch>,
    disk: Option<ThresholdLatch>,
}

impl AlertLatches {
    pub fn new(config: AlertConfig) -> Self {
        Self {
            battery: ThresholdLatch::new(Some(config.battery_low), Some(config.battery_high)),
            temperature: config.temperature_high.map(ThresholdLatch::high_only),
            memory: config.memory_high.map(ThresholdLatch::high_only),
            disk: config.disk_high.map(ThresholdLatch::high_only),
            config,
        }
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    /// Low fires only while discharging, high only while charging.
    pub fn battery(&mut self, percent: f64, charging: bool) -> Option<Alert> {
        let gate = if charging { Gate::HighOnly } else { Gate::LowOnly };
        match self.battery.observe(percent, gate)? {
            Crossing::Low => Some(Alert {
                severity: AlertSeverity::Critical,
                category: AlertCategory::Battery,
                message: format!(
                    "Battery at {}%. Connect the AC adapter.",
                    format_percent(percent)
                ),
                value: percent,
                threshold: self.config.battery_low,
            }),
            Crossing::High => Some(Alert {
                severity: AlertSeverity::Info,
                category: AlertCategory::Battery,
                message: "The PC is sufficiently charged.".to_string(),
                value: percent,
                threshold: self.config.battery_high,
            }),
        }
    }

    pub fn temperature(&mut self, sensor: &str, celsius: f64) -> Option<Alert> {
        let threshold = self.config.temperature_high?;
        self.temperature.as_mut()?.observe(celsius, Gate::HighOnly)?;
        Some(Alert {
            severity: AlertSeverity::Critical,
            category: AlertCategory::Temperature(sensor.to_string()),
            message: format!(
                "{} at {:.1}°C (critical threshold: {:.1}°C)",
                sensor, celsius, threshold
            ),
            value: celsius,
            threshold,
        })
    }

    pub fn memory(&mut self, percent: f64) -> Option<Alert> {
        let threshold = self.config.memory_high?;
        self.memory.as_mut()?.observe(percent, Gate::HighOnly)?;
        Some(Alert {
            severity: AlertSeverity::Warning,
            category: AlertCategory::Memory,
            message: format!(
                "Memory usage at {:.1}% (threshold: {:.1}%)",
                percent, threshold
            ),
            value: percent,
            threshold,
        })
    }

    pub fn disk(&mut self, percent: f64) -> Option<Alert> {
        let threshold = self.config.disk_high?;
        self.disk.as_mut()?.observe(percent, Gate::HighOnly)?;
        Some(Alert {
            severity: AlertSeverity::Warning,
            category: AlertCategory::Disk,
            message: format!(
                "Disk at {:.1}% capacity (threshold: {:.1}%)",
                percent, threshold
            ),
            value: percent,
            threshold,
        })
    }
}

fn format_percent(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}
