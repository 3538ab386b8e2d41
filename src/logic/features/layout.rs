//! Feature Layout - Per-target feature definition
//!
//! **This controls the feature schema a model is trained against.**
//!
//! ## Rules
//! 1. Column order is fixed: lags (1..=k), rolling mean, rolling std, calendar
//! 2. Changing the order or the naming scheme -> increment FEATURE_LAYOUT_VERSION
//! 3. A model only accepts vectors whose layout hash equals its own

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use crate::logic::error::{AnalyticsError, AnalyticsResult};

// ============================================================================
// LAYOUT VERSION
// ============================================================================

/// Current feature layout version
pub const FEATURE_LAYOUT_VERSION: u8 = 1;

/// Calendar columns appended after the target-derived columns
pub const CALENDAR_COLUMNS: &[&str] = &["hour", "day_of_week", "day_of_year"];

// ============================================================================
// FEATURE LAYOUT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureLayout {
    pub target: String,
    pub lag_depth: usize,
    pub window_size: usize,
    pub version: u8,
    /// CRC32 over version, window size and column names
    pub hash: u32,
    /// Column names in vector order
    pub columns: Vec<String>,
}

impl FeatureLayout {
    pub fn new(target: &str, lag_depth: usize, window_size: usize) -> Self {
        let mut columns: Vec<String> = (1..=lag_depth)
            .map(|i| format!("{}_lag_{}", target, i))
            .collect();
        columns.push(format!("{}_rolling_mean", target));
        columns.push(format!("{}_rolling_std", target));
        columns.extend(CALENDAR_COLUMNS.iter().map(|c| c.to_string()));

        let hash = compute_layout_hash(FEATURE_LAYOUT_VERSION, window_size, &columns);

        Self {
            target: target.to_string(),
            lag_depth,
            window_size,
            version: FEATURE_LAYOUT_VERSION,
            hash,
            columns,
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Positions consumed before the first complete row: max(k, w)
    pub fn warmup(&self) -> usize {
        self.lag_depth.max(self.window_size)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn lag_index(&self, lag: usize) -> Option<usize> {
        (1..=self.lag_depth).contains(&lag).then(|| lag - 1)
    }

    pub fn rolling_mean_index(&self) -> usize {
        self.lag_depth
    }

    pub fn rolling_std_index(&self) -> usize {
        self.lag_depth + 1
    }

    pub fn calendar_index(&self) -> usize {
        self.lag_depth + 2
    }

    /// Reject vectors built against a different layout
    pub fn validate(&self, version: u8, hash: u32) -> AnalyticsResult<()> {
        if version != self.version || hash != self.hash {
            return Err(AnalyticsError::LayoutMismatch {
                expected_version: self.version,
                expected_hash: self.hash,
                actual_version: version,
                actual_hash: hash,
            });
        }
        Ok(())
    }
}

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 of the layout, used to detect mismatches at inference time.
/// The window size is hashed too: it changes rolling semantics, not names.
pub fn compute_layout_hash(version: u8, window_size: usize, columns: &[String]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[version]);
    hasher.update(&(window_size as u64).to_le_bytes());

    for name in columns {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}
