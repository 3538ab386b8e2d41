use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::layout::FeatureLayout;

/// Feature vector for one position of a target series
///
/// `values` follows the order of the `FeatureLayout` whose hash is carried
/// in `layout_hash`. Never build one by hand outside the builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub timestamp: DateTime<Utc>,
    pub device_id: String,
    /// Target value at this position; `None` for the synthetic next-step row
    pub label: Option<f64>,
    /// Index of this row's position in the target series
    pub position: usize,
    pub layout_version: u8,
    pub layout_hash: u32,
    pub lag_depth: usize,
    pub values: Vec<f64>,
}

impl FeatureRow {
    pub(crate) fn new(
        layout: &FeatureLayout,
        timestamp: DateTime<Utc>,
        device_id: &str,
        label: Option<f64>,
        position: usize,
        values: Vec<f64>,
    ) -> Self {
        Self {
            timestamp,
            device_id: device_id.to_string(),
            label,
            position,
            layout_version: layout.version,
            layout_hash: layout.hash,
            lag_depth: layout.lag_depth,
            values,
        }
    }

    /// Lag `i` (1-based)
    pub fn lag(&self, i: usize) -> Option<f64> {
        if i == 0 || i > self.lag_depth {
            return None;
        }
        self.values.get(i - 1).copied()
    }

    pub fn lags(&self) -> &[f64] {
        &self.values[..self.lag_depth]
    }

    pub fn rolling_mean(&self) -> f64 {
        self.values[self.lag_depth]
    }

    pub fn rolling_std(&self) -> f64 {
        self.values[self.lag_depth + 1]
    }

    /// Value of a named layout column
    pub fn get(&self, layout: &FeatureLayout, column: &str) -> Option<f64> {
        layout.index_of(column).and_then(|i| self.values.get(i).copied())
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}
