//! Trained model entry

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::error::{AnalyticsError, AnalyticsResult};
use crate::logic::features::{FeatureLayout, FeatureRow};
use crate::logic::model::{FittedRegressor, ModelKind, ModelMetrics, Regressor, StandardScaler};

/// Where the forecast loop starts from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeed {
    /// Most recent feature row of the training series
    pub row: FeatureRow,
    /// Target values at the `warmup` positions right before `row`, oldest first
    pub history: Vec<f64>,
    pub last_timestamp: DateTime<Utc>,
    pub step_seconds: i64,
    pub device_id: String,
}

impl ForecastSeed {
    pub fn step(&self) -> Duration {
        Duration::seconds(self.step_seconds)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    pub regressor: FittedRegressor,
    /// Held-out metrics
    pub metrics: ModelMetrics,
}

impl FittedModel {
    pub fn kind(&self) -> ModelKind {
        self.regressor.kind()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    pub target: String,
    pub layout: FeatureLayout,
    pub scaler: StandardScaler,
    pub models: Vec<FittedModel>,
    /// Regressor the forecast loop uses
    pub selected: ModelKind,
    pub train_rows: usize,
    pub test_rows: usize,
    pub trained_at: DateTime<Utc>,
    pub seed: ForecastSeed,
}

impl TrainedModel {
    pub fn model(&self, kind: ModelKind) -> Option<&FittedModel> {
        self.models.iter().find(|m| m.kind() == kind)
    }

    pub fn selected_model(&self) -> AnalyticsResult<&FittedModel> {
        self.model(self.selected).ok_or_else(|| {
            AnalyticsError::InvalidConfig(format!(
                "model '{}' was not trained for target '{}'",
                self.selected, self.target
            ))
        })
    }

    /// Predict from an unscaled row; the row must carry this model's layout
    pub fn predict(&self, row: &FeatureRow) -> AnalyticsResult<f64> {
        self.layout.validate(row.layout_version, row.layout_hash)?;
        let scaled = self.scaler.transform(row.as_slice());
        Ok(self.selected_model()?.regressor.predict(&scaled))
    }

    pub fn metrics(&self) -> TargetMetrics {
        TargetMetrics {
            target: self.target.clone(),
            selected: self.selected,
            models: self.models.iter().map(|m| (m.kind(), m.metrics)).collect(),
            train_rows: self.train_rows,
            test_rows: self.test_rows,
            trained_at: self.trained_at,
        }
    }
}

/// Per-target evaluation summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetMetrics {
    pub target: String,
    pub selected: ModelKind,
    pub models: BTreeMap<ModelKind, ModelMetrics>,
    pub train_rows: usize,
    pub test_rows: usize,
    pub trained_at: DateTime<Utc>,
}
