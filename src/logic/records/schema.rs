//! Sensor Schema
//!
//! Explicit column semantics for raw exports. Nothing is inferred from the
//! data: a column is categorical only if the schema says so, and every other
//! non-key column is parsed as a number.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_SENSORS, DEVICE_COLUMN, TIMESTAMP_COLUMN};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

/// One logical sensor and the raw column it is read from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorColumn {
    /// Logical name, e.g. "temperature"
    pub name: String,
    /// Raw header in the export, e.g. "tempC"
    pub column: String,
    pub unit: String,
    #[serde(default)]
    pub description: String,
    pub kind: ColumnKind,
}

impl SensorColumn {
    pub fn numeric(name: &str, column: &str, unit: &str) -> Self {
        Self {
            name: name.to_string(),
            column: column.to_string(),
            unit: unit.to_string(),
            description: String::new(),
            kind: ColumnKind::Numeric,
        }
    }

    pub fn categorical(name: &str, column: &str) -> Self {
        Self {
            name: name.to_string(),
            column: column.to_string(),
            unit: String::new(),
            description: String::new(),
            kind: ColumnKind::Categorical,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSchema {
    pub timestamp_column: String,
    pub device_column: String,
    pub sensors: Vec<SensorColumn>,
}

impl Default for SensorSchema {
    fn default() -> Self {
        let sensors = DEFAULT_SENSORS
            .iter()
            .map(|(name, column, unit, description, categorical)| SensorColumn {
                name: name.to_string(),
                column: column.to_string(),
                unit: unit.to_string(),
                description: description.to_string(),
                kind: if *categorical { ColumnKind::Categorical } else { ColumnKind::Numeric },
            })
            .collect();

        Self {
            timestamp_column: TIMESTAMP_COLUMN.to_string(),
            device_column: DEVICE_COLUMN.to_string(),
            sensors,
        }
    }
}

impl SensorSchema {
    /// Schema with the standard key columns and the given sensors
    pub fn new(sensors: Vec<SensorColumn>) -> Self {
        Self {
            timestamp_column: TIMESTAMP_COLUMN.to_string(),
            device_column: DEVICE_COLUMN.to_string(),
            sensors,
        }
    }

    /// Kind of a raw column; columns absent from the schema are numeric
    pub fn kind_of(&self, column: &str) -> ColumnKind {
        self.sensors
            .iter()
            .find(|s| s.column == column)
            .map(|s| s.kind)
            .unwrap_or(ColumnKind::Numeric)
    }

    pub fn is_categorical(&self, column: &str) -> bool {
        self.kind_of(column) == ColumnKind::Categorical
    }

    /// Look up a sensor by logical name
    pub fn sensor(&self, name: &str) -> Option<&SensorColumn> {
        self.sensors.iter().find(|s| s.name == name)
    }

    /// Resolve a logical name or a raw column to the raw column
    pub fn resolve_column<'a>(&'a self, name_or_column: &'a str) -> &'a str {
        self.sensor(name_or_column)
            .map(|s| s.column.as_str())
            .unwrap_or(name_or_column)
    }

    pub fn numeric_sensors(&self) -> Vec<&str> {
        self.names_of(ColumnKind::Numeric)
    }

    pub fn categorical_sensors(&self) -> Vec<&str> {
        self.names_of(ColumnKind::Categorical)
    }

    fn names_of(&self, kind: ColumnKind) -> Vec<&str> {
        self.sensors
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| s.name.as_str())
            .collect()
    }

    /// Serializable summary of the schema for collaborators
    pub fn listing(&self) -> SchemaListing {
        SchemaListing {
            sensors: self.sensors.clone(),
            total: self.sensors.len(),
            numeric: self.numeric_sensors().into_iter().map(String::from).collect(),
            categorical: self.categorical_sensors().into_iter().map(String::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaListing {
    pub sensors: Vec<SensorColumn>,
    pub total: usize,
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}
