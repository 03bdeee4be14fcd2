use std::fmt;

use serde::{Serialize, Serializer};

/// Display text for a rate that cannot be computed yet.
pub const NOT_CONNECTED: &str = "Not connected";

/// Display text for a reading the provider could not deliver.
pub const UNAVAILABLE: &str = "N/A";

/// A single reading value as it flows through one tick.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Float(f64),
    Int(i64),
    Text(String),
    /// Sensor could not be read this tick
    Unavailable,
    /// Rate source has no computable rate this tick
    NotConnected,
}

/// Shape of a value, used to decide how history samples are displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Float,
    Int,
    String,
}

impl Scalar {
    /// Numeric view of the value, `None` for text, sentinels and NaN.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Float(v) if v.is_finite() => Some(*v),
            Scalar::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Scalar::Float(_) => ValueKind::Float,
            Scalar::Int(_) => ValueKind::Int,
            Scalar::Text(_) | Scalar::Unavailable | Scalar::NotConnected => ValueKind::String,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, Scalar::Unavailable | Scalar::NotConnected)
    }

    /// Float readings that came back as NaN are folded into `Unavailable`.
    pub fn from_reading(value: Option<f32>) -> Self {
        match value {
            Some(v) if v.is_finite() => Scalar::Float(v as f64),
            _ => Scalar::Unavailable,
        }
    }
}

/// Floats get one decimal place, everything else its plain display text.
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Float(v) if v.is_nan() => f.write_str(UNAVAILABLE),
            Scalar::Float(v) => write!(f, "{:.1}", v),
            Scalar::Int(v) => write!(f, "{}", v),
            Scalar::Text(s) => f.write_str(s),
            Scalar::Unavailable => f.write_str(UNAVAILABLE),
            Scalar::NotConnected => f.write_str(NOT_CONNECTED),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Float(v) if v.is_finite() => serializer.serialize_f64(*v),
            Scalar::Float(_) | Scalar::Unavailable => serializer.serialize_none(),
            Scalar::Int(v) => serializer.serialize_i64(*v),
            Scalar::Text(s) => serializer.serialize_str(s),
            Scalar::NotConnected => serializer.serialize_str(NOT_CONNECTED),
        }
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<f32> for Scalar {
    fn from(v: f32) -> Self {
        Scalar::Float(v as f64)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<u32> for Scalar {
    fn from(v: u32) -> Self {
        Scalar::Int(v as i64)
    }
}

impl From<usize> for Scalar {
    fn from(v: usize) -> Self {
        Scalar::Int(v as i64)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Text(v)
    }
}
