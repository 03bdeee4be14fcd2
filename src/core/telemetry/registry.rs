//! Ordered, collision-safe hierarchical store for one tick's snapshot.
//!
//! A registry maps display names to scalars, sequences, or nested registries.
//! Registering a name that is already bound never overwrites: the value is
//! stored under the first free key among `name`, `name_1`, `name_2`, ...

use std::fmt;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::value::Scalar;

/// Input accepted by [`MetricRegistry::register`].
///
/// Providers declare the shape of what they hand over; nothing is probed at
/// runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Scalar(Scalar),
    Sequence(Vec<RawValue>),
    /// Key/value pairs in order; becomes a nested registry
    Mapping(Vec<(String, RawValue)>),
    /// An already built registry, stored as-is
    Registry(MetricRegistry),
}

/// A value bound inside a registry.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Scalar(Scalar),
    Sequence(Vec<MetricValue>),
    Nested(MetricRegistry),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricRegistry {
    entries: IndexMap<String, MetricValue>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `value` under `name`, or under the first free `name_N`.
    ///
    /// Returns the key actually used.
    pub fn register<V: Into<RawValue>>(&mut self, name: &str, value: V) -> String {
        let key = self.free_key(name);
        let value = MetricValue::from_raw(value.into());
        self.entries.insert(key.clone(), value);
        key
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&MetricValue> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetricValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Deep list of the values in insertion order; keys are dropped.
    pub fn to_flat_list(&self) -> Value {
        Value::Array(self.entries.values().map(MetricValue::to_flat_list).collect())
    }

    /// Deep key/value structure in insertion order, ready for JSON output.
    pub fn to_nested_map(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.to_nested_map()))
            .collect();
        Value::Object(map)
    }

    fn free_key(&self, name: &str) -> String {
        if !self.contains(name) {
            return name.to_string();
        }
        // At most len() candidates can be taken, so this terminates.
        (1..)
            .map(|n| format!("{}_{}", name, n))
            .find(|candidate| !self.contains(candidate))
            .unwrap_or_else(|| name.to_string())
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let pad = "  ".repeat(depth);
        for (key, value) in &self.entries {
            match value {
                MetricValue::Scalar(s) => writeln!(f, "{}{:<40}{}", pad, key, s)?,
                MetricValue::Sequence(items) => {
                    writeln!(f, "{}{:<40}(size: {})", pad, key, items.len())?;
                    for item in items {
                        match item {
                            MetricValue::Nested(r) => r.fmt_indented(f, depth + 2)?,
                            other => writeln!(f, "{}    {}", pad, other.to_flat_list())?,
                        }
                    }
                }
                MetricValue::Nested(r) => {
                    writeln!(f, "{}{}", pad, key)?;
                    r.fmt_indented(f, depth + 1)?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for MetricRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

impl MetricValue {
    fn from_raw(raw: RawValue) -> Self {
        match raw {
            RawValue::Scalar(s) => MetricValue::Scalar(s),
            RawValue::Sequence(items) => {
                MetricValue::Sequence(items.into_iter().map(MetricValue::from_raw).collect())
            }
            RawValue::Mapping(pairs) => {
                let mut nested = MetricRegistry::new();
                for (k, v) in pairs {
                    nested.register(&k, v);
                }
                MetricValue::Nested(nested)
            }
            RawValue::Registry(r) => MetricValue::Nested(r),
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            MetricValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_registry(&self) -> Option<&MetricRegistry> {
        match self {
            MetricValue::Nested(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[MetricValue]> {
        match self {
            MetricValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    fn to_flat_list(&self) -> Value {
        match self {
            MetricValue::Scalar(s) => scalar_json(s),
            MetricValue::Sequence(items) => {
                Value::Array(items.iter().map(MetricValue::to_flat_list).collect())
            }
            MetricValue::Nested(r) => r.to_flat_list(),
        }
    }

    fn to_nested_map(&self) -> Value {
        match self {
            MetricValue::Scalar(s) => scalar_json(s),
            MetricValue::Sequence(items) => {
                Value::Array(items.iter().map(MetricValue::to_nested_map).collect())
            }
            MetricValue::Nested(r) => r.to_nested_map(),
        }
    }
}

fn scalar_json(s: &Scalar) -> Value {
    serde_json::to_value(s).unwrap_or(Value::Null)
}

macro_rules! raw_scalar_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for RawValue {
                fn from(v: $t) -> Self {
                    RawValue::Scalar(v.into())
                }
            }
        )*
    };
}

raw_scalar_from!(f64, f32, i64, u32, usize, &str, String);

impl From<Scalar> for RawValue {
    fn from(s: Scalar) -> Self {
        RawValue::Scalar(s)
    }
}

impl From<MetricRegistry> for RawValue {
    fn from(r: MetricRegistry) -> Self {
        RawValue::Registry(r)
    }
}

impl From<Vec<MetricRegistry>> for RawValue {
    fn from(items: Vec<MetricRegistry>) -> Self {
        RawValue::Sequence(items.into_iter().map(RawValue::Registry).collect())
    }
}
