use std::collections::VecDeque;

use serde::Serialize;

use super::value::{Scalar, ValueKind};

/// Samples kept per displayed metric.
pub const HISTORY_CAPACITY: usize = 30;

/// Rolling window of recent samples for one displayed metric (for charts).
///
/// Samples are always numeric: sentinels and text are stored as 0 so the
/// chart stays homogeneous, while the last formatted value is kept for the
/// textual readout.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryBuffer {
    capacity: usize,
    values: VecDeque<f64>,
    pub is_percentage_range: bool,
    pub value_kind: ValueKind,
    last_display: String,
}

impl HistoryBuffer {
    /// Buffer pre-filled with zeros, with `initial` as the newest sample.
    pub fn new(initial: &Scalar, is_percentage_range: bool) -> Self {
        Self::with_capacity(HISTORY_CAPACITY, initial, is_percentage_range)
    }

    pub fn with_capacity(capacity: usize, initial: &Scalar, is_percentage_range: bool) -> Self {
        let mut values = VecDeque::with_capacity(capacity + 1);
        values.extend(std::iter::repeat(0.0).take(capacity.saturating_sub(1)));

        let mut buffer = Self {
            capacity,
            values,
            is_percentage_range,
            value_kind: placeholder_kind(initial),
            last_display: String::new(),
        };
        buffer.append(initial);
        buffer
    }

    pub fn append(&mut self, value: &Scalar) {
        self.values.push_back(value.as_f64().unwrap_or(0.0));
        if self.values.len() > self.capacity {
            self.values.pop_front();
        }
        self.last_display = value.to_string();
    }

    pub fn values(&self) -> &VecDeque<f64> {
        &self.values
    }

    pub fn latest(&self) -> Option<f64> {
        self.values.back().copied()
    }

    pub fn last_display(&self) -> &str {
        &self.last_display
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether this metric can be charted at all.
    pub fn is_chartable(&self) -> bool {
        self.value_kind != ValueKind::String
    }

    /// Y-axis bounds for the chart renderer.
    pub fn y_range(&self) -> (f64, f64) {
        if self.is_percentage_range {
            return (0.0, 100.0);
        }

        let min = self.values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !min.is_finite() || !max.is_finite() {
            return (0.0, 1.0);
        }

        ((min - 1.0).max(0.0), max + 1.0)
    }
}

/// A rate that starts out `NotConnected` is still a float series.
fn placeholder_kind(initial: &Scalar) -> ValueKind {
    match initial {
        Scalar::NotConnected | Scalar::Unavailable => ValueKind::Float,
        other => other.kind(),
    }
}
