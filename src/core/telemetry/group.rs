//! Parent/children display hierarchy for same-category readings.

use serde::Serialize;

use super::sensor::Reading;
use crate::error::{Result, SensorboardError};

/// A display label plus what is needed to find its value again next tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensorName {
    pub name: String,
    pub tag: Option<String>,
    pub identifier: Option<String>,
    pub unit: String,
}

impl SensorName {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tag: None,
            identifier: None,
            unit: String::new(),
        }
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tag = Some(tag.to_string());
        self
    }

    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = unit.to_string();
        self
    }

    pub fn from_reading(reading: &Reading) -> Self {
        Self {
            name: reading.name.clone(),
            tag: Some(reading.category.as_str().to_string()),
            identifier: Some(reading.identifier.clone()),
            unit: reading.unit().to_string(),
        }
    }

    pub fn is_name(&self, name: &str) -> bool {
        self.name == name
    }
}

/// First reading becomes the parent row (relabelled), the rest its children.
#[derive(Debug, Clone, Serialize)]
pub struct SensorGroup {
    parent: SensorName,
    children: Vec<SensorName>,
}

impl SensorGroup {
    /// Build a group from readings already in canonical order.
    ///
    /// The parent keeps its identifier so its value can still be looked up;
    /// only its label changes.
    pub fn new(readings: &[Reading], custom_label: Option<&str>) -> Result<Self> {
        let (first, rest) = readings.split_first().ok_or(SensorboardError::EmptyGroup)?;

        let mut parent = SensorName::from_reading(first);
        let children: Vec<SensorName> = rest.iter().map(SensorName::from_reading).collect();

        parent.name = match custom_label {
            Some(label) => label.to_string(),
            None if !children.is_empty() => format!("{}s", first.category),
            None => first.category.to_string(),
        };

        Ok(Self { parent, children })
    }

    /// Whether `identifier` belongs to one of the child rows.
    pub fn is_children(&self, identifier: &str) -> bool {
        self.children
            .iter()
            .any(|c| c.identifier.as_deref() == Some(identifier))
    }

    pub fn parent(&self) -> &SensorName {
        &self.parent
    }

    pub fn parent_name(&self) -> &str {
        &self.parent.name
    }

    pub fn children(&self) -> &[SensorName] {
        &self.children
    }

    pub fn children_names(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.name.as_str()).collect()
    }

    /// Parent first, then children in their original order.
    pub fn names(&self) -> Vec<&SensorName> {
        std::iter::once(&self.parent).chain(self.children.iter()).collect()
    }
}
