//! Sensor telemetry pipeline.
//!
//! Providers deliver raw readings each tick; the orchestrator turns them
//! into a fixed table of colored rows with per-row history, latched alerts
//! and an on-demand JSON dump.

pub mod alerts;
pub mod classify;
pub mod group;
pub mod history;
pub mod orchestrator;
pub mod persistence;
pub mod rate;
pub mod registry;
pub mod scheduler;
pub mod sensor;
pub mod table;
pub mod value;

pub use alerts::{Alert, AlertCategory, AlertConfig, AlertLatches, AlertSeverity, ThresholdLatch};
pub use classify::{classify, Color, MetricClass};
pub use group::{SensorGroup, SensorName};
pub use history::{HistoryBuffer, HISTORY_CAPACITY};
pub use orchestrator::{DisplayRow, Orchestrator, OrchestratorOptions, TickReport};
pub use rate::{CounterSample, CounterSource, RateReading, RateTracker, MAX_WAIT_COUNT};
pub use registry::{MetricRegistry, MetricValue, RawValue};
pub use scheduler::{Cadence, Scheduler, SchedulerHandle};
pub use sensor::{
    AcStatus, ChargeStatus, HardwareKind, NotificationSink, PowerStatus, Reading, SensorKind,
    SensorProvider, SystemProbe,
};
pub use table::{DisplayTable, PanelMode, RowSource, TableRow};
pub use value::{Scalar, ValueKind};
