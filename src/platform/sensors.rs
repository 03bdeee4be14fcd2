//! Hardware sensor readings backed by sysinfo.

use std::thread;

use sysinfo::{Components, CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};

use crate::core::telemetry::{HardwareKind, Reading, SensorKind, SensorProvider};
use crate::error::Result;

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Reads CPU load and clocks, memory use and component temperatures.
pub struct SysinfoProvider {
    system: System,
    components: Components,
    cpu_name: String,
}

impl SysinfoProvider {
    /// Primes the CPU counters so the first poll already has usage figures.
    pub fn new() -> Self {
        let refresh_kind = RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::everything())
            .with_memory(MemoryRefreshKind::everything());
        let mut system = System::new_with_specifics(refresh_kind);
        thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        system.refresh_cpu_all();

        let cpu_name = system
            .cpus()
            .first()
            .map(|c| c.brand().trim().to_string())
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| "CPU".to_string());

        Self {
            system,
            components: Components::new_with_refreshed_list(),
            cpu_name,
        }
    }

    fn cpu_readings(&self, out: &mut Vec<Reading>) {
        let cpus = self.system.cpus();

        out.push(self.reading(
            HardwareKind::Cpu,
            &self.cpu_name,
            SensorKind::Load,
            0,
            "CPU Total",
            Some(self.system.global_cpu_usage()),
        ));
        for (i, cpu) in cpus.iter().enumerate() {
            let core = i as u32 + 1;
            out.push(self.reading(
                HardwareKind::Cpu,
                &self.cpu_name,
                SensorKind::Load,
                core,
                &format!("CPU Core #{}", core),
                Some(cpu.cpu_usage()),
            ));
        }

        for (i, cpu) in cpus.iter().enumerate() {
            let frequency = cpu.frequency();
            out.push(self.reading(
                HardwareKind::Cpu,
                &self.cpu_name,
                SensorKind::Clock,
                i as u32,
                &format!("CPU Core #{}", i + 1),
                (frequency > 0).then_some(frequency as f32),
            ));
        }
    }

    fn memory_readings(&self, out: &mut Vec<Reading>) {
        let total = self.system.total_memory();
        let used = self.system.used_memory();
        let available = self.system.available_memory();

        let load = (total > 0).then(|| (used as f64 / total as f64 * 100.0) as f32);
        out.push(self.reading(HardwareKind::Ram, "Generic Memory", SensorKind::Load, 0, "Memory", load));
        out.push(self.reading(
            HardwareKind::Ram,
            "Generic Memory",
            SensorKind::Data,
            0,
            "Used Memory",
            Some((used as f64 / BYTES_PER_GB) as f32),
        ));
        out.push(self.reading(
            HardwareKind::Ram,
            "Generic Memory",
            SensorKind::Data,
            1,
            "Available Memory",
            Some((available as f64 / BYTES_PER_GB) as f32),
        ));
    }

    /// Components are sorted by label so indices stay stable across polls.
    fn temperature_readings(&self, out: &mut Vec<Reading>) {
        let mut components: Vec<_> = self.components.iter().collect();
        components.sort_by_key(|c| (!is_package_label(c.label()), c.label().to_string()));

        let mut next_index = std::collections::HashMap::new();
        for component in components {
            let label = component.label();
            let hardware = hardware_for_label(label);
            let index = next_index.entry(hardware).or_insert(0u32);

            let hardware_name = match hardware {
                HardwareKind::Cpu => self.cpu_name.as_str(),
                other => other.as_str(),
            };
            let mut reading = self.reading(
                hardware,
                hardware_name,
                SensorKind::Temperature,
                *index,
                label,
                component.temperature(),
            );
            reading.max = component.max();
            out.push(reading);
            *index += 1;
        }
    }

    fn reading(
        &self,
        hardware: HardwareKind,
        hardware_name: &str,
        category: SensorKind,
        index: u32,
        name: &str,
        value: Option<f32>,
    ) -> Reading {
        Reading {
            identifier: format!(
                "/{}/{}/{}",
                hardware.as_str().to_lowercase(),
                category.as_str().to_lowercase(),
                index
            ),
            hardware,
            hardware_name: hardware_name.to_string(),
            category,
            name: name.to_string(),
            index,
            value,
            min: None,
            max: None,
        }
    }
}

impl Default for SysinfoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorProvider for SysinfoProvider {
    fn poll(&mut self) -> Result<Vec<Reading>> {
        self.system.refresh_cpu_all();
        self.system.refresh_memory();
        self.components.refresh(true);

        let mut readings = Vec::new();
        self.cpu_readings(&mut readings);
        self.memory_readings(&mut readings);
        self.temperature_readings(&mut readings);
        Ok(readings)
    }
}

/// Package or die sensors go first so they become the group parent.
fn is_package_label(label: &str) -> bool {
    let label = label.to_lowercase();
    label.contains("package") || label.contains("tctl") || label.contains("tdie")
}

fn hardware_for_label(label: &str) -> HardwareKind {
    let label = label.to_lowercase();
    if label.contains("nvidia") {
        HardwareKind::GpuNvidia
    } else if label.contains("amdgpu") || label.contains("radeon") {
        HardwareKind::GpuAti
    } else if label.contains("nvme") || label.contains("drivetemp") {
        HardwareKind::Hdd
    } else if ["cpu", "core", "package", "k10temp", "coretemp", "tctl", "tdie"]
        .iter()
        .any(|k| label.contains(k))
    {
        HardwareKind::Cpu
    } else {
        HardwareKind::Mainboard
    }
}
