//! Anomaly Detector
//!
//! Multivariate outlier labelling over any row type exposing named numeric
//! columns. Missing cells are imputed with the column mean; columns with no
//! values at all are dropped.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::forest::IsolationForest;
use super::threshold::{ContaminationThreshold, ThresholdStats};
use crate::logic::config::AnomalyConfig;
use crate::logic::error::{AnalyticsError, AnalyticsResult};
use crate::logic::features::{FeatureLayout, FeatureRow};
use crate::logic::records::SensorRecord;

// ============================================================================
// INPUT
// ============================================================================

/// A row the detector can score
pub trait NumericSource {
    fn timestamp(&self) -> DateTime<Utc>;
    fn device_id(&self) -> &str;
    /// Value of a named column, `None` when absent or missing
    fn numeric(&self, column: &str) -> Option<f64>;
}

impl NumericSource for SensorRecord {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn device_id(&self) -> &str {
        &self.device_id
    }

    fn numeric(&self, column: &str) -> Option<f64> {
        self.value(column)
    }
}

/// A feature row read through its layout's column names
#[derive(Debug, Clone, Copy)]
pub struct FeatureView<'a> {
    pub layout: &'a FeatureLayout,
    pub row: &'a FeatureRow,
}

impl NumericSource for FeatureView<'_> {
    fn timestamp(&self) -> DateTime<Utc> {
        self.row.timestamp
    }

    fn device_id(&self) -> &str {
        &self.row.device_id
    }

    fn numeric(&self, column: &str) -> Option<f64> {
        self.row.get(self.layout, column)
    }
}

// ============================================================================
// OUTPUT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyLabel {
    /// Position in the input sequence
    pub row_index: usize,
    pub timestamp: DateTime<Utc>,
    pub device_id: String,
    pub is_anomaly: bool,
    /// In [0, 1); lower = more anomalous
    pub anomaly_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub labels: Vec<AnomalyLabel>,
    pub columns_used: Vec<String>,
    pub columns_dropped: Vec<String>,
    pub imputed_cells: usize,
    pub threshold: ThresholdStats,
}

impl AnomalyReport {
    pub fn anomalies(&self) -> impl Iterator<Item = &AnomalyLabel> {
        self.labels.iter().filter(|l| l.is_anomaly)
    }

    pub fn anomaly_count(&self) -> usize {
        self.threshold.flagged
    }
}

// ============================================================================
// DETECTOR
// ============================================================================

#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    config: AnomalyConfig,
}

impl AnomalyDetector {
    pub fn new(config: AnomalyConfig) -> AnalyticsResult<Self> {
        if !(config.contamination > 0.0 && config.contamination < 1.0) {
            return Err(AnalyticsError::InvalidConfig(format!(
                "contamination must be in (0, 1), got {}",
                config.contamination
            )));
        }
        if config.n_trees == 0 || config.sample_size == 0 {
            return Err(AnalyticsError::InvalidConfig(
                "n_trees and sample_size must be >= 1".into(),
            ));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnomalyConfig {
        &self.config
    }

    /// Score every row and flag the `round(contamination * n)` most isolated
    pub fn detect<S: NumericSource + Sync>(&self, rows: &[S]) -> AnalyticsResult<AnomalyReport> {
        if rows.is_empty() {
            return Err(AnalyticsError::EmptyDataset);
        }

        let mut columns_used = Vec::new();
        let mut columns_dropped = Vec::new();
        let mut means = Vec::new();

        for column in &self.config.columns {
            let present: Vec<f64> = rows.iter().filter_map(|r| r.numeric(column)).collect();
            if present.is_empty() {
                log::warn!("Anomaly column '{}' has no values, dropping it", column);
                columns_dropped.push(column.clone());
                continue;
            }
            let n = present.len() as f64;
            means.push(present.iter().map(|v| v / n).sum::<f64>());
            columns_used.push(column.clone());
        }

        if columns_used.is_empty() {
            return Err(AnalyticsError::NoUsableFeatures);
        }

        let mut imputed_cells = 0usize;
        let matrix: Vec<Vec<f64>> = rows
            .iter()
            .map(|r| {
                columns_used
                    .iter()
                    .zip(&means)
                    .map(|(c, mean)| {
                        r.numeric(c).unwrap_or_else(|| {
                            imputed_cells += 1;
                            *mean
                        })
                    })
                    .collect()
            })
            .collect();

        if imputed_cells > 0 {
            log::debug!("Imputed {} missing cells with column means", imputed_cells);
        }

        let forest = IsolationForest::fit(
            &matrix,
            self.config.n_trees,
            self.config.sample_size,
            self.config.seed,
        );

        let scores: Vec<f64> = matrix.par_iter().map(|point| 1.0 - forest.score(point)).collect();
        let outcome = ContaminationThreshold::new(self.config.contamination).select(&scores);

        let labels = rows
            .iter()
            .zip(scores.iter().zip(&outcome.flags))
            .enumerate()
            .map(|(row_index, (row, (score, flag)))| AnomalyLabel {
                row_index,
                timestamp: row.timestamp(),
                device_id: row.device_id().to_string(),
                is_anomaly: *flag,
                anomaly_score: *score,
            })
            .collect();

        log::info!(
            "Anomaly detection: {} of {} rows flagged over {} columns ({} trees)",
            outcome.stats.flagged,
            rows.len(),
            columns_used.len(),
            forest.n_trees()
        );

        Ok(AnomalyReport {
            labels,
            columns_used,
            columns_dropped,
            imputed_cells,
            threshold: outcome.stats,
        })
    }

    /// Score feature rows, addressing columns by layout name
    pub fn detect_features(
        &self,
        rows: &[FeatureRow],
        layout: &FeatureLayout,
    ) -> AnalyticsResult<AnomalyReport> {
        let views: Vec<FeatureView<'_>> = rows.iter().map(|row| FeatureView { layout, row }).collect();
        self.detect(&views)
    }
}
