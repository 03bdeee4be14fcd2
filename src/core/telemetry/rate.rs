//! Turns a pair of monotonic byte counters into KB/s rates.
//!
//! The tracker tells apart three failure shapes, each with its own recovery:
//! no source at all (retry discovery every `MAX_WAIT_COUNT` ticks), a source
//! whose counters went backwards (drop everything, rediscover next tick), and
//! a source that has not moved for `MAX_WAIT_COUNT` ticks (drop the binding).

use std::time::Instant;

use log::debug;
use serde::Serialize;

use super::value::Scalar;

/// Consecutive stalled ticks before the source is considered gone.
pub const MAX_WAIT_COUNT: u32 = 4;

/// One read of a counter pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterSample {
    pub sent: u64,
    pub received: u64,
    pub timestamp: Instant,
}

/// A family of counter-pair sources, e.g. network adapters.
pub trait CounterSource {
    /// First usable source (known link, nonzero counters), if any.
    fn discover(&mut self) -> Option<String>;

    /// Current counters of a previously discovered source; `None` once the
    /// source has disappeared.
    fn read(&mut self, source: &str) -> Option<CounterSample>;
}

/// Result of one tracker poll.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum RateReading {
    NotConnected,
    /// KB/s in each direction
    Rate { sent: f64, received: f64 },
}

impl RateReading {
    pub fn sent(&self) -> Scalar {
        match self {
            RateReading::Rate { sent, .. } => Scalar::Float(*sent),
            RateReading::NotConnected => Scalar::NotConnected,
        }
    }

    pub fn received(&self) -> Scalar {
        match self {
            RateReading::Rate { received, .. } => Scalar::Float(*received),
            RateReading::NotConnected => Scalar::NotConnected,
        }
    }
}

/// Read-only view of the tracker internals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateTrackerState {
    pub bound: bool,
    pub last_counter: Option<(u64, u64)>,
    #[serde(skip)]
    pub last_timestamp: Option<Instant>,
    pub stall_count: u32,
}

pub struct RateTracker {
    source: Box<dyn CounterSource>,
    bound: Option<String>,
    baseline: Option<CounterSample>,
    stall_count: u32,
}

impl RateTracker {
    /// Discovery is deferred to the first poll.
    pub fn new(source: Box<dyn CounterSource>) -> Self {
        Self {
            source,
            bound: None,
            baseline: None,
            stall_count: 0,
        }
    }

    /// Run one tick of the state machine.
    pub fn poll(&mut self) -> RateReading {
        let source = match self.bound.clone() {
            Some(source) => source,
            None => match self.try_discover() {
                Some(source) => source,
                None => return RateReading::NotConnected,
            },
        };

        let Some(current) = self.source.read(&source) else {
            debug!("Counter source {} disappeared", source);
            self.unbind();
            return RateReading::NotConnected;
        };

        // Bootstrap: nothing to diff against yet
        let Some(baseline) = self.baseline else {
            self.baseline = Some(current);
            return RateReading::NotConnected;
        };

        if current.sent < baseline.sent || current.received < baseline.received {
            debug!("Counters of {} went backwards, rediscovering", source);
            self.unbind();
            return RateReading::NotConnected;
        }

        if current.sent == baseline.sent && current.received == baseline.received {
            self.stall_count += 1;
            if self.stall_count >= MAX_WAIT_COUNT {
                debug!(
                    "{} idle for {} ticks, dropping binding",
                    source, self.stall_count
                );
                self.unbind();
            }
            return RateReading::NotConnected;
        }

        let elapsed = current
            .timestamp
            .saturating_duration_since(baseline.timestamp)
            .as_secs_f64();
        if elapsed <= 0.0 {
            return RateReading::NotConnected;
        }

        let sent = (current.sent - baseline.sent) as f64 / (1024.0 * elapsed);
        let received = (current.received - baseline.received) as f64 / (1024.0 * elapsed);

        self.stall_count = 0;
        self.baseline = Some(current);
        RateReading::Rate { sent, received }
    }

    /// Forget the current source; the next poll rediscovers.
    pub fn force_rediscover(&mut self) {
        self.unbind();
    }

    pub fn bound_source(&self) -> Option<&str> {
        self.bound.as_deref()
    }

    pub fn state(&self) -> RateTrackerState {
        RateTrackerState {
            bound: self.bound.is_some(),
            last_counter: self.baseline.map(|b| (b.sent, b.received)),
            last_timestamp: self.baseline.map(|b| b.timestamp),
            stall_count: self.stall_count,
        }
    }

    /// Discovery runs when the stall counter is at zero, so an absent
    /// source is retried once every `MAX_WAIT_COUNT` ticks.
    fn try_discover(&mut self) -> Option<String> {
        if self.stall_count == 0 {
            if let Some(source) = self.source.discover() {
                debug!("Bound counter source {}", source);
                self.bound = Some(source.clone());
                return Some(source);
            }
        }

        self.stall_count += 1;
        if self.stall_count >= MAX_WAIT_COUNT {
            self.stall_count = 0;
        }
        None
    }

    fn unbind(&mut self) {
        self.bound = None;
        self.baseline = None;
        self.stall_count = 0;
    }
}

impl std::fmt::Debug for RateTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateTracker")
            .field("bound", &self.bound)
            .field("baseline", &self.baseline)
            .field("stall_count", &self.stall_count)
            .finish()
    }
}
