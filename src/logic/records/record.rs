use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Categorical cell: raw string plus its label-encoded index within the batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalValue {
    pub raw: String,
    pub encoded: Option<u32>,
}

impl CategoricalValue {
    pub fn new(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            encoded: None,
        }
    }
}

/// One normalized sensor reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorRecord {
    pub timestamp: DateTime<Utc>,
    pub device_id: String,
    /// Raw column -> value, `None` when missing or unparsable
    pub numeric: BTreeMap<String, Option<f64>>,
    pub categorical: BTreeMap<String, CategoricalValue>,
}

impl SensorRecord {
    pub fn new(timestamp: DateTime<Utc>, device_id: &str) -> Self {
        Self {
            timestamp,
            device_id: device_id.to_string(),
            numeric: BTreeMap::new(),
            categorical: BTreeMap::new(),
        }
    }

    pub fn with_numeric(mut self, column: &str, value: Option<f64>) -> Self {
        self.numeric.insert(column.to_string(), value);
        self
    }

    /// Numeric value of a column, `None` if absent or null
    pub fn value(&self, column: &str) -> Option<f64> {
        self.numeric.get(column).copied().flatten()
    }

    pub fn has_numeric(&self, column: &str) -> bool {
        self.numeric.contains_key(column)
    }

    pub fn category(&self, column: &str) -> Option<&CategoricalValue> {
        self.categorical.get(column)
    }
}

/// Values of one column across a record sequence, in sequence order
pub fn column_values(records: &[SensorRecord], column: &str) -> Vec<Option<f64>> {
    records.iter().map(|r| r.value(column)).collect()
}

/// Average spacing between consecutive records in seconds.
/// `None` for fewer than two records or a zero-length span.
pub fn average_interval_secs(records: &[SensorRecord]) -> Option<f64> {
    let first = records.first()?;
    let last = records.last()?;
    if records.len() < 2 {
        return None;
    }

    let span = (last.timestamp - first.timestamp).num_milliseconds() as f64 / 1000.0;
    if span <= 0.0 {
        return None;
    }
    Some(span / (records.len() - 1) as f64)
}
