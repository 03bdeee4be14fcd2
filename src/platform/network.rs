//! Network adapter byte counters.

use std::time::Instant;

use log::debug;
use sysinfo::Networks;

use crate::core::telemetry::{CounterSample, CounterSource};

pub struct NetworkCounters {
    networks: Networks,
}

impl NetworkCounters {
    pub fn new() -> Self {
        Self {
            networks: Networks::new_with_refreshed_list(),
        }
    }
}

impl Default for NetworkCounters {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterSource for NetworkCounters {
    /// First non-loopback interface (by name) that has moved bytes both ways.
    fn discover(&mut self) -> Option<String> {
        self.networks.refresh(true);

        let mut candidates: Vec<(&String, u64, u64)> = self
            .networks
            .iter()
            .filter(|(name, _)| !is_loopback(name))
            .map(|(name, data)| (name, data.total_transmitted(), data.total_received()))
            .collect();
        candidates.sort_by(|a, b| a.0.cmp(b.0));
        debug!("Network interfaces considered: {}", candidates.len());

        candidates
            .into_iter()
            .find(|(_, sent, received)| *sent > 0 && *received > 0)
            .map(|(name, _, _)| name.clone())
    }

    fn read(&mut self, source: &str) -> Option<CounterSample> {
        self.networks.refresh(true);
        let data = self.networks.get(source)?;

        Some(CounterSample {
            sent: data.total_transmitted(),
            received: data.total_received(),
            timestamp: Instant::now(),
        })
    }
}

fn is_loopback(name: &str) -> bool {
    let name = name.to_lowercase();
    name == "lo" || name.starts_with("lo0") || name.contains("loopback")
}
