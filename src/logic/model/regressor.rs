//! Regressor - the seam between training and the forecast loop

use std::fmt;

use serde::{Deserialize, Serialize};

use super::forest::RandomForest;
use super::linear::LinearModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Linear,
    RandomForest,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Linear => "linear",
            ModelKind::RandomForest => "random_forest",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fitted model mapping a scaled feature vector to a target value
pub trait Regressor: Send + Sync {
    fn kind(&self) -> ModelKind;

    fn predict(&self, features: &[f64]) -> f64;

    fn predict_many(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        rows.iter().map(|r| self.predict(r)).collect()
    }
}

impl Regressor for LinearModel {
    fn kind(&self) -> ModelKind {
        ModelKind::Linear
    }

    fn predict(&self, features: &[f64]) -> f64 {
        LinearModel::predict(self, features)
    }
}

impl Regressor for RandomForest {
    fn kind(&self) -> ModelKind {
        ModelKind::RandomForest
    }

    fn predict(&self, features: &[f64]) -> f64 {
        RandomForest::predict(self, features)
    }
}

/// Owned, serializable regressor of either family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FittedRegressor {
    Linear(LinearModel),
    RandomForest(RandomForest),
}

impl Regressor for FittedRegressor {
    fn kind(&self) -> ModelKind {
        match self {
            FittedRegressor::Linear(_) => ModelKind::Linear,
            FittedRegressor::RandomForest(_) => ModelKind::RandomForest,
        }
    }

    fn predict(&self, features: &[f64]) -> f64 {
        match self {
            FittedRegressor::Linear(m) => m.predict(features),
            FittedRegressor::RandomForest(m) => m.predict(features),
        }
    }
}
