//! Display color for a metric value.
//!
//! Every rule is a pure function of the metric class, the value and an
//! optional upper bound.

use std::fmt;

use serde::{Serialize, Serializer};

use super::value::Scalar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

pub const NEUTRAL: Color = Color::new(255, 255, 255);
pub const GREEN: Color = Color::new(124, 252, 0);
pub const YELLOW: Color = Color::new(255, 255, 0);
pub const RED: Color = Color::new(255, 0, 0);

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// How a row's value maps to a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MetricClass {
    Temperature,
    Load,
    Battery,
    /// Disk or memory utilisation
    Utilisation,
    /// Scaled against an observed maximum
    Power,
    Fan,
    AcStatus,
    BatteryStatus,
    Plain,
}

pub fn classify(class: MetricClass, value: &Scalar, bound: Option<f64>) -> Color {
    match class {
        MetricClass::AcStatus => value.as_str().map(ac_status_color).unwrap_or(NEUTRAL),
        MetricClass::BatteryStatus => value
            .as_str()
            .map(battery_status_color)
            .unwrap_or(NEUTRAL),
        MetricClass::Plain => NEUTRAL,
        numeric => match value.as_f64() {
            Some(v) => numeric_color(numeric, v, bound),
            None => NEUTRAL,
        },
    }
}

fn numeric_color(class: MetricClass, value: f64, bound: Option<f64>) -> Color {
    match class {
        MetricClass::Temperature | MetricClass::Load => heat_color(value),
        MetricClass::Battery => battery_color(value),
        MetricClass::Utilisation => utilisation_color(value),
        MetricClass::Power | MetricClass::Fan => match bound {
            Some(max) if max > 0.0 => heat_color(value / max * 100.0),
            _ => NEUTRAL,
        },
        _ => NEUTRAL,
    }
}

/// White at 0 fading linearly to red at 100.
pub fn heat_color(value: f64) -> Color {
    let v = value.clamp(0.0, 100.0);
    let w = (255.0 * (1.0 - v / 100.0)) as u8;
    Color::new(255, w, w)
}

/// Red to yellow over the lower half, yellow to green over the upper half.
pub fn battery_color(value: f64) -> Color {
    let v = (255.0 * value.clamp(0.0, 100.0) / 100.0) as i32;
    let (r, g) = if v < 0x80 {
        (255, v * 2)
    } else {
        (
            ((-0x83 * v + 0xc001) as f64 / 0x7f as f64).round() as i32,
            ((-0x03 * v + 0x8001) as f64 / 0x7f as f64).round() as i32,
        )
    };
    Color::new(r.clamp(0, 255) as u8, g.clamp(0, 255) as u8, 0)
}

/// Cubic ease: stays pale until utilisation gets close to full.
pub fn utilisation_color(value: f64) -> Color {
    let v = value.clamp(0.0, 100.0) / 100.0;
    let w = (255.0 * (1.0 - v.powi(3))).clamp(0.0, 255.0) as u8;
    Color::new(255, w, w)
}

pub fn ac_status_color(status: &str) -> Color {
    match status {
        "Offline" => YELLOW,
        "Online" => GREEN,
        _ => NEUTRAL,
    }
}

pub fn battery_status_color(status: &str) -> Color {
    match status {
        "High" | "Charging" | "Charging(High)" => GREEN,
        "Low" | "Charging(Low)" => YELLOW,
        "Critical" => RED,
        _ => NEUTRAL,
    }
}
