//! Disk, process and battery figures.

use std::path::Path;

use battery::units::ratio::percent;
use log::{debug, warn};
use sysinfo::{Disks, ProcessRefreshKind, ProcessesToUpdate, RefreshKind, System};

use crate::core::telemetry::{AcStatus, ChargeStatus, PowerStatus, SystemProbe};

/// Percent thresholds for the charge bands.
const HIGH_CHARGE: f64 = 66.0;
const LOW_CHARGE: f64 = 33.0;
const CRITICAL_CHARGE: f64 = 5.0;

pub struct HostProbe {
    system: System,
    disks: Disks,
    battery: Option<battery::Manager>,
}

impl HostProbe {
    pub fn new() -> Self {
        let battery = match battery::Manager::new() {
            Ok(manager) => Some(manager),
            Err(e) => {
                warn!("Battery information unavailable: {}", e);
                None
            }
        };

        Self {
            system: System::new_with_specifics(
                RefreshKind::nothing().with_processes(ProcessRefreshKind::nothing()),
            ),
            disks: Disks::new_with_refreshed_list(),
            battery,
        }
    }
}

impl Default for HostProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemProbe for HostProbe {
    /// Used space of the disk mounted at the filesystem root (or the
    /// Windows system drive), falling back to the first disk listed.
    fn disk_usage(&mut self) -> Option<f64> {
        self.disks.refresh(true);

        let system_disk = self
            .disks
            .iter()
            .find(|d| is_system_mount(d.mount_point()))
            .or_else(|| self.disks.iter().next())?;

        let total = system_disk.total_space();
        if total == 0 {
            return None;
        }
        let used = total.saturating_sub(system_disk.available_space());
        Some(used as f64 / total as f64 * 100.0)
    }

    fn process_count(&mut self) -> Option<usize> {
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing(),
        );
        Some(self.system.processes().len())
    }

    fn power_status(&mut self) -> Option<PowerStatus> {
        let manager = self.battery.as_ref()?;
        let mut batteries = match manager.batteries() {
            Ok(batteries) => batteries,
            Err(e) => {
                debug!("Cannot enumerate batteries: {}", e);
                return None;
            }
        };

        let battery = match batteries.next() {
            Some(Ok(battery)) => battery,
            Some(Err(e)) => {
                debug!("Cannot read battery: {}", e);
                return Some(no_battery(AcStatus::Unknown));
            }
            None => return Some(no_battery(AcStatus::Online)),
        };

        let pct = battery.state_of_charge().get::<percent>() as f64;
        let ac = match battery.state() {
            battery::State::Charging | battery::State::Full => AcStatus::Online,
            battery::State::Discharging | battery::State::Empty => AcStatus::Offline,
            _ => AcStatus::Unknown,
        };
        let charging = battery.state() == battery::State::Charging;

        Some(PowerStatus {
            ac,
            percent: pct.round(),
            charge: charge_status(pct, charging),
        })
    }
}

fn no_battery(ac: AcStatus) -> PowerStatus {
    PowerStatus {
        ac,
        percent: 0.0,
        charge: ChargeStatus::NoSystemBattery,
    }
}

fn is_system_mount(mount: &Path) -> bool {
    mount == Path::new("/") || mount == Path::new("C:\\")
}

/// Charge band of a battery, combined with the charging flag.
pub fn charge_status(pct: f64, charging: bool) -> ChargeStatus {
    match (charging, pct) {
        (true, p) if p > HIGH_CHARGE => ChargeStatus::ChargingHigh,
        (true, p) if p < CRITICAL_CHARGE => ChargeStatus::ChargingCritical,
        (true, p) if p < LOW_CHARGE => ChargeStatus::ChargingLow,
        (true, _) => ChargeStatus::Charging,
        (false, p) if p > HIGH_CHARGE => ChargeStatus::High,
        (false, p) if p < CRITICAL_CHARGE => ChargeStatus::Critical,
        (false, p) if p < LOW_CHARGE => ChargeStatus::Low,
        (false, _) => ChargeStatus::Uncharged,
    }
}
