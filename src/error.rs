use std::io;
use thiserror::Error;

/// Custom error type for the sensorboard library
#[derive(Error, Debug)]
pub enum SensorboardError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Sensor provider error: {0}")]
    Provider(String),

    #[error("Cannot build a sensor group from an empty reading list")]
    EmptyGroup,
}

/// Result type alias for the sensorboard library
pub type Result<T> = std::result::Result<T, SensorboardError>;

impl SensorboardError {
    /// Create a sensor provider error
    pub fn provider<S: Into<String>>(msg: S) -> Self {
        SensorboardError::Provider(msg.into())
    }

    /// Whether this error came from the OS refusing access.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, SensorboardError::Io(e) if e.kind() == io::ErrorKind::PermissionDenied)
    }
}
