//! Model Registry
//!
//! target -> `Arc<TrainedModel>`. Register replaces; readers holding an old
//! `Arc` keep a consistent model.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::entry::{TargetMetrics, TrainedModel};
use crate::logic::error::{AnalyticsError, AnalyticsResult};

#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: RwLock<HashMap<String, Arc<TrainedModel>>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; returns the model that was replaced
    pub fn register(&self, model: TrainedModel) -> Option<Arc<TrainedModel>> {
        let target = model.target.clone();
        let previous = self.models.write().insert(target.clone(), Arc::new(model));
        if previous.is_some() {
            log::info!("Replaced model for '{}'", target);
        } else {
            log::info!("Registered model for '{}'", target);
        }
        previous
    }

    pub fn lookup(&self, target: &str) -> AnalyticsResult<Arc<TrainedModel>> {
        self.models
            .read()
            .get(target)
            .cloned()
            .ok_or_else(|| AnalyticsError::UnknownTarget(target.to_string()))
    }

    pub fn remove(&self, target: &str) -> Option<Arc<TrainedModel>> {
        self.models.write().remove(target)
    }

    pub fn contains(&self, target: &str) -> bool {
        self.models.read().contains_key(target)
    }

    /// Registered targets, sorted
    pub fn targets(&self) -> Vec<String> {
        let mut targets: Vec<String> = self.models.read().keys().cloned().collect();
        targets.sort();
        targets
    }

    /// Metrics of every registered model, sorted by target
    pub fn metrics(&self) -> Vec<TargetMetrics> {
        let mut metrics: Vec<TargetMetrics> = self.models.read().values().map(|m| m.metrics()).collect();
        metrics.sort_by(|a, b| a.target.cmp(&b.target));
        metrics
    }

    pub fn len(&self) -> usize {
        self.models.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.read().is_empty()
    }
}
