// Scriptable collaborators shared by the integration tests

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

use sensorboard::core::telemetry::{
    AcStatus, ChargeStatus, CounterSample, CounterSource, HardwareKind, NotificationSink,
    Orchestrator, OrchestratorOptions, PowerStatus, Reading, SensorKind, SensorProvider,
    SystemProbe,
};
use sensorboard::{Result, SensorboardError};

pub fn reading(hw: HardwareKind, cat: SensorKind, index: u32, name: &str, value: f32) -> Reading {
    Reading {
        identifier: format!("/{}/{}/{}", hw.as_str().to_lowercase(), cat.as_str().to_lowercase(), index),
        hardware: hw,
        hardware_name: format!("Test {}", hw),
        category: cat,
        name: name.to_string(),
        index,
        value: Some(value),
        min: None,
        max: None,
    }
}

/// A laptop-ish machine: package temp, total + two cores, one clock, RAM.
pub fn laptop_readings() -> Vec<Reading> {
    vec![
        reading(HardwareKind::Cpu, SensorKind::Load, 2, "CPU Core #2", 30.0),
        reading(HardwareKind::Cpu, SensorKind::Load, 0, "CPU Total", 20.0),
        reading(HardwareKind::Cpu, SensorKind::Load, 1, "CPU Core #1", 10.0),
        reading(HardwareKind::Cpu, SensorKind::Temperature, 0, "CPU Package", 55.0),
        reading(HardwareKind::Cpu, SensorKind::Clock, 0, "CPU Core #1", 2400.0),
        reading(HardwareKind::Ram, SensorKind::Load, 0, "Memory", 48.0),
    ]
}

pub fn on_battery(percent: f64) -> PowerStatus {
    PowerStatus {
        ac: AcStatus::Offline,
        percent,
        charge: if percent < 33.0 {
            ChargeStatus::Low
        } else {
            ChargeStatus::High
        },
    }
}

pub fn on_mains(percent: f64) -> PowerStatus {
    PowerStatus {
        ac: AcStatus::Online,
        percent,
        charge: ChargeStatus::ChargingHigh,
    }
}

#[derive(Clone, Default)]
pub struct FakeProvider {
    pub readings: Rc<RefCell<Vec<Reading>>>,
    pub fail: Rc<RefCell<bool>>,
}

impl FakeProvider {
    pub fn set_value(&self, identifier: &str, value: Option<f32>) {
        for r in self.readings.borrow_mut().iter_mut() {
            if r.identifier == identifier {
                r.value = value;
            }
        }
    }
}

impl SensorProvider for FakeProvider {
    fn poll(&mut self) -> Result<Vec<Reading>> {
        if *self.fail.borrow() {
            return Err(SensorboardError::provider("sensor service stopped"));
        }
        Ok(self.readings.borrow().clone())
    }
}

#[derive(Clone, Default)]
pub struct FakeProbe {
    pub power: Rc<RefCell<Option<PowerStatus>>>,
    pub disk: Rc<RefCell<Option<f64>>>,
    pub processes: Rc<RefCell<Option<usize>>>,
}

impl SystemProbe for FakeProbe {
    fn disk_usage(&mut self) -> Option<f64> {
        *self.disk.borrow()
    }

    fn process_count(&mut self) -> Option<usize> {
        *self.processes.borrow()
    }

    fn power_status(&mut self) -> Option<PowerStatus> {
        *self.power.borrow()
    }
}

/// Replays queued (sent, received) pairs one second apart.
#[derive(Clone)]
pub struct FakeNetwork {
    pub connected: Rc<RefCell<bool>>,
    pub queue: Rc<RefCell<VecDeque<(u64, u64)>>>,
    clock: Rc<RefCell<Instant>>,
}

impl Default for FakeNetwork {
    fn default() -> Self {
        Self {
            connected: Rc::new(RefCell::new(false)),
            queue: Rc::default(),
            clock: Rc::new(RefCell::new(Instant::now())),
        }
    }
}

impl FakeNetwork {
    pub fn push(&self, sent: u64, received: u64) {
        self.queue.borrow_mut().push_back((sent, received));
    }
}

impl CounterSource for FakeNetwork {
    fn discover(&mut self) -> Option<String> {
        self.connected.borrow().then(|| "eth0".to_string())
    }

    fn read(&mut self, _source: &str) -> Option<CounterSample> {
        let (sent, received) = self.queue.borrow_mut().pop_front()?;
        let mut clock = self.clock.borrow_mut();
        *clock += Duration::from_secs(1);
        Some(CounterSample {
            sent,
            received,
            timestamp: *clock,
        })
    }
}

#[derive(Clone, Default)]
pub struct Inbox(pub Rc<RefCell<Vec<String>>>);

impl Inbox {
    pub fn messages(&self) -> Vec<String> {
        self.0.borrow().clone()
    }
}

impl NotificationSink for Inbox {
    fn notify(&mut self, message: &str) {
        self.0.borrow_mut().push(message.to_string());
    }
}

#[derive(Clone, Default)]
pub struct Harness {
    pub provider: FakeProvider,
    pub probe: FakeProbe,
    pub network: FakeNetwork,
    pub inbox: Inbox,
}

impl Harness {
    pub fn laptop() -> Self {
        let harness = Self::default();
        *harness.provider.readings.borrow_mut() = laptop_readings();
        *harness.probe.power.borrow_mut() = Some(on_battery(80.0));
        *harness.probe.disk.borrow_mut() = Some(40.0);
        *harness.probe.processes.borrow_mut() = Some(210);
        harness
    }

    pub fn build(&self) -> Orchestrator {
        self.build_with(OrchestratorOptions::default())
    }

    pub fn build_with(&self, options: OrchestratorOptions) -> Orchestrator {
        Orchestrator::new(
            Box::new(self.provider.clone()),
            Box::new(self.probe.clone()),
            Box::new(self.network.clone()),
            Box::new(self.inbox.clone()),
            options,
        )
    }
}
