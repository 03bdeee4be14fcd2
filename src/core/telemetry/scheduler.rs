//! Fixed-cadence tick loop.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use serde::Serialize;

use super::orchestrator::{Orchestrator, TickReport};

/// Sleep granularity while waiting for the next tick, so a stop request is
/// honoured promptly.
const SLEEP_SLICE: Duration = Duration::from_millis(50);

/// Normal and fast refresh periods, with a toggle between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cadence {
    pub normal_ms: u64,
    pub fast_ms: u64,
    pub fast: bool,
}

impl Default for Cadence {
    fn default() -> Self {
        Self::new(1000, 500)
    }
}

impl Cadence {
    pub fn new(normal_ms: u64, fast_ms: u64) -> Self {
        Self {
            normal_ms: normal_ms.max(1),
            fast_ms: fast_ms.max(1),
            fast: false,
        }
    }

    pub fn toggle(&mut self) {
        self.fast = !self.fast;
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(if self.fast { self.fast_ms } else { self.normal_ms })
    }
}

/// Shared flags a signal handler or another thread can flip while the loop
/// runs.
#[derive(Debug, Clone, Default)]
pub struct SchedulerHandle {
    stop: Arc<AtomicBool>,
    fast: Arc<AtomicBool>,
    dump: Arc<AtomicBool>,
    rediscover: Arc<AtomicBool>,
}

impl SchedulerHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    pub fn toggle_cadence(&self) {
        self.fast.fetch_xor(true, Ordering::SeqCst);
    }

    /// Ask for a snapshot dump after the current tick.
    pub fn request_dump(&self) {
        self.dump.store(true, Ordering::SeqCst);
    }

    /// Ask for the network adapter to be rediscovered before the next tick.
    pub fn request_rediscover(&self) {
        self.rediscover.store(true, Ordering::SeqCst);
    }

    pub fn is_fast(&self) -> bool {
        self.fast.load(Ordering::SeqCst)
    }

    fn take_dump(&self) -> bool {
        self.dump.swap(false, Ordering::SeqCst)
    }

    fn take_rediscover(&self) -> bool {
        self.rediscover.swap(false, Ordering::SeqCst)
    }
}

pub struct Scheduler {
    cadence: Cadence,
    handle: SchedulerHandle,
    max_ticks: Option<u64>,
    dump_dir: PathBuf,
}

impl Scheduler {
    pub fn new(cadence: Cadence) -> Self {
        let handle = SchedulerHandle::new();
        if cadence.fast {
            handle.toggle_cadence();
        }
        Self {
            cadence,
            handle,
            max_ticks: None,
            dump_dir: PathBuf::from("."),
        }
    }

    /// Stop on its own after `ticks` ticks.
    pub fn with_max_ticks(mut self, ticks: Option<u64>) -> Self {
        self.max_ticks = ticks;
        self
    }

    /// Where requested dumps are written.
    pub fn with_dump_dir(mut self, dir: PathBuf) -> Self {
        self.dump_dir = dir;
        self
    }

    pub fn handle(&self) -> SchedulerHandle {
        self.handle.clone()
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    /// Runs tick, callback, sleep until stopped. A tick is never interrupted
    /// halfway; the stop flag is only checked between ticks and while
    /// sleeping. Returns the number of ticks run.
    pub fn run<F>(&mut self, orchestrator: &mut Orchestrator, mut on_tick: F) -> u64
    where
        F: FnMut(&Orchestrator, &TickReport),
    {
        info!(
            "Starting tick loop at {} ms",
            self.cadence.interval().as_millis()
        );
        let mut ticks = 0u64;

        while !self.handle.is_stopped() {
            let started = Instant::now();
            if self.handle.take_rediscover() {
                orchestrator.force_rediscover();
            }
            let report = orchestrator.tick();
            on_tick(&*orchestrator, &report);
            ticks += 1;

            // Failures are already reported to the notification sink
            if self.handle.take_dump() {
                if let Err(e) = orchestrator.dump(&self.dump_dir) {
                    warn!("Requested dump failed: {}", e);
                }
            }

            if self.max_ticks.is_some_and(|max| ticks >= max) {
                break;
            }

            if self.cadence.fast != self.handle.is_fast() {
                self.cadence.toggle();
                info!(
                    "Refresh interval changed to {} ms",
                    self.cadence.interval().as_millis()
                );
            }

            let deadline = started + self.cadence.interval();
            self.sleep_until(deadline);
        }

        debug!("Tick loop stopped after {} ticks", ticks);
        ticks
    }

    fn sleep_until(&self, deadline: Instant) {
        loop {
            if self.handle.is_stopped() {
                return;
            }
            let now = Instant::now();
            if now >= deadline {
                return;
            }
            thread::sleep((deadline - now).min(SLEEP_SLICE));
        }
    }
}
