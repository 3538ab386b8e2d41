//! Feature Builder
//!
//! Expands a sorted record sequence into `FeatureRow`s for one target.
//! Sequence position, not timestamp, is the ordering key.
//!
//! At position `p`:
//! - lag `i` = target[p - i]
//! - rolling mean/std over target[p - w .. p] (current value excluded)
//! - calendar from timestamp[p]
//!
//! Rows with any missing input or a missing label are not emitted.

use chrono::{DateTime, Duration, Utc};

use super::calendar::CalendarFeatures;
use super::layout::FeatureLayout;
use super::row::FeatureRow;
use super::stats::window_stats;
use crate::logic::config::FeatureConfig;
use crate::logic::error::{AnalyticsError, AnalyticsResult};
use crate::logic::records::record::column_values;
use crate::logic::records::SensorRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureBuilder {
    lag_depth: usize,
    window_size: usize,
}

impl FeatureBuilder {
    pub fn new(lag_depth: usize, window_size: usize) -> AnalyticsResult<Self> {
        if lag_depth == 0 {
            return Err(AnalyticsError::InvalidConfig("lag_depth must be >= 1".into()));
        }
        if window_size == 0 {
            return Err(AnalyticsError::InvalidConfig("window_size must be >= 1".into()));
        }
        Ok(Self { lag_depth, window_size })
    }

    pub fn from_config(config: &FeatureConfig) -> AnalyticsResult<Self> {
        Self::new(config.lag_depth, config.window_size)
    }

    pub fn lag_depth(&self) -> usize {
        self.lag_depth
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn layout(&self, target: &str) -> FeatureLayout {
        FeatureLayout::new(target, self.lag_depth, self.window_size)
    }

    /// Build every complete row for `target`.
    ///
    /// Too little history yields an empty vector. A target column that no
    /// record carries is `UnknownColumn`.
    pub fn build(&self, records: &[SensorRecord], target: &str) -> AnalyticsResult<Vec<FeatureRow>> {
        if !records.is_empty() && !records.iter().any(|r| r.has_numeric(target)) {
            return Err(AnalyticsError::UnknownColumn(target.to_string()));
        }

        let layout = self.layout(target);
        let series = column_values(records, target);
        let warmup = layout.warmup();

        let mut rows = Vec::with_capacity(series.len().saturating_sub(warmup));
        let mut skipped = 0usize;

        for p in warmup..series.len() {
            let Some(label) = series[p] else {
                skipped += 1;
                continue;
            };

            let lags: Option<Vec<f64>> = (1..=self.lag_depth).map(|i| series[p - i]).collect();
            let window: Option<Vec<f64>> = series[p - self.window_size..p].iter().copied().collect();

            let (Some(lags), Some(window)) = (lags, window) else {
                skipped += 1;
                continue;
            };

            let record = &records[p];
            let values = self.compose(&lags, &window, &record.timestamp);
            rows.push(FeatureRow::new(&layout, record.timestamp, &record.device_id, Some(label), p, values));
        }

        log::debug!(
            "Built {} feature rows for '{}' (k={}, w={}, {} incomplete skipped)",
            rows.len(),
            target,
            self.lag_depth,
            self.window_size,
            skipped
        );

        Ok(rows)
    }

    /// Assemble a vector in layout order.
    ///
    /// `lags[0]` is lag-1. `window` holds the trailing values used for the
    /// rolling statistics, oldest first.
    pub fn compose(&self, lags: &[f64], window: &[f64], timestamp: &DateTime<Utc>) -> Vec<f64> {
        let (mean, std) = window_stats(window);
        let calendar = CalendarFeatures::from_timestamp(timestamp);

        let mut values = Vec::with_capacity(self.lag_depth + 5);
        values.extend_from_slice(&lags[..self.lag_depth]);
        values.push(mean);
        values.push(std);
        values.extend_from_slice(&calendar.as_values());
        values
    }

    /// Row for the position right after `history`, at `last_timestamp + step`.
    ///
    /// `history` is the target series, oldest first, without gaps.
    pub fn next_row(
        &self,
        target: &str,
        history: &[f64],
        last_timestamp: DateTime<Utc>,
        step: Duration,
        device_id: &str,
    ) -> AnalyticsResult<FeatureRow> {
        let layout = self.layout(target);
        let required = layout.warmup();
        if history.len() < required {
            return Err(AnalyticsError::InsufficientData {
                required,
                actual: history.len(),
            });
        }

        let lags: Vec<f64> = history.iter().rev().take(self.lag_depth).copied().collect();
        let window = &history[history.len() - self.window_size..];
        let timestamp = last_timestamp + step;
        let values = self.compose(&lags, window, &timestamp);

        Ok(FeatureRow::new(&layout, timestamp, device_id, None, history.len(), values))
    }
}
