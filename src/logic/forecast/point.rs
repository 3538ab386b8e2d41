use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::features::FeatureRow;
use crate::logic::model::ModelKind;

/// One predicted value of a target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub target: String,
    pub model: ModelKind,
    /// 1-based position within the horizon
    pub step: usize,
}

/// A forecast point with the feature row it was predicted from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastStep {
    pub input: FeatureRow,
    pub point: ForecastPoint,
}
