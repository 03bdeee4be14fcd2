// Host-specific collaborators for the telemetry pipeline

pub mod network;
pub mod notify;
pub mod probe;
pub mod sensors;

pub use network::NetworkCounters;
pub use notify::ConsoleNotifier;
pub use probe::HostProbe;
pub use sensors::SysinfoProvider;
