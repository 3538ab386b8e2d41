//! Analytics Pipeline
//!
//! normalize -> filter -> detect -> per-target train + forecast -> summary.
//! A failing stage or target is recorded in the report and the rest of the
//! run continues; only an empty dataset or a bad config aborts the run.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::summary::{device_ids, summarize, SensorSummary};
use crate::logic::anomaly::{AnomalyDetector, AnomalyLabel, AnomalyReport};
use crate::logic::config::{AnalyticsConfig, AnomalyConfig};
use crate::logic::error::{AnalyticsError, AnalyticsResult};
use crate::logic::features::FeatureBuilder;
use crate::logic::forecast::{ForecastEngine, ForecastPoint};
use crate::logic::records::{normalize_rows, NormalizeStats, RecordFilter, SensorRecord};
use crate::logic::registry::{ModelRegistry, TargetMetrics};

// ============================================================================
// REPORT
// ============================================================================

/// A stage or target that did not complete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageFailure {
    pub stage: String,
    pub target: Option<String>,
    pub kind: String,
    pub message: String,
}

impl StageFailure {
    fn new(stage: &str, target: Option<&str>, error: &AnalyticsError) -> Self {
        Self {
            stage: stage.to_string(),
            target: target.map(String::from),
            kind: error.kind().to_string(),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: i64,
    pub normalize: NormalizeStats,
    /// Records left after filtering
    pub record_count: usize,
    pub devices: Vec<String>,
    pub anomalies: Option<AnomalyReport>,
    pub forecasts: BTreeMap<String, Vec<ForecastPoint>>,
    pub metrics: Vec<TargetMetrics>,
    pub sensors: Vec<SensorSummary>,
    pub failures: Vec<StageFailure>,
}

impl PipelineReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn anomaly_labels(&self) -> &[AnomalyLabel] {
        self.anomalies.as_ref().map(|a| a.labels.as_slice()).unwrap_or(&[])
    }

    /// Every forecast point, ordered by target then step
    pub fn forecast_points(&self) -> impl Iterator<Item = &ForecastPoint> {
        self.forecasts.values().flatten()
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

pub struct AnalyticsPipeline {
    config: AnalyticsConfig,
    registry: Arc<ModelRegistry>,
    filter: Option<RecordFilter>,
}

impl AnalyticsPipeline {
    pub fn new(config: AnalyticsConfig) -> AnalyticsResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            registry: Arc::new(ModelRegistry::new()),
            filter: None,
        })
    }

    /// Share a registry with other pipelines or readers
    pub fn with_registry(mut self, registry: Arc<ModelRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_filter(mut self, filter: RecordFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// Run from raw rows, first row = header
    pub fn run_rows<S: AsRef<str>>(&self, rows: &[Vec<S>]) -> AnalyticsResult<PipelineReport> {
        let batch = normalize_rows(rows, &self.config.schema)?;
        self.run_records(batch.records, batch.stats)
    }

    /// Run from already-normalized records
    pub fn run_records(
        &self,
        records: Vec<SensorRecord>,
        normalize: NormalizeStats,
    ) -> AnalyticsResult<PipelineReport> {
        let started_at = Utc::now();
        let run_id = Uuid::new_v4();
        let schema = &self.config.schema;

        let records = match &self.filter {
            Some(filter) => filter.apply(records),
            None => records,
        };
        if records.is_empty() {
            return Err(AnalyticsError::EmptyDataset);
        }

        log::info!("Pipeline run {} started on {} records", run_id, records.len());

        let builder = FeatureBuilder::from_config(&self.config.features)?;
        let engine = ForecastEngine::new(builder, self.config.forecast.clone())?;
        let mut failures = Vec::new();

        // Anomaly detection
        let anomaly_config = AnomalyConfig {
            columns: self
                .config
                .anomaly
                .columns
                .iter()
                .map(|c| schema.resolve_column(c).to_string())
                .collect(),
            ..self.config.anomaly.clone()
        };
        let anomalies = match AnomalyDetector::new(anomaly_config).and_then(|d| d.detect(&records)) {
            Ok(report) => Some(report),
            Err(e) => {
                log::warn!("Anomaly detection failed: {}", e);
                failures.push(StageFailure::new("anomaly", None, &e));
                None
            }
        };

        // Per-target training and forecasting
        let mut targets: Vec<String> = Vec::new();
        for t in &self.config.targets {
            let column = schema.resolve_column(t).to_string();
            if !targets.contains(&column) {
                targets.push(column);
            }
        }

        let horizon = self.config.forecast.horizon;
        let run_target = |target: &String| {
            let result = engine
                .train_and_register(&self.registry, &records, target)
                .and_then(|_| engine.forecast(&self.registry, target, horizon));
            (target.clone(), result)
        };

        let outcomes: Vec<(String, AnalyticsResult<Vec<ForecastPoint>>)> = if self.config.parallel {
            targets.par_iter().map(run_target).collect()
        } else {
            targets.iter().map(run_target).collect()
        };

        let mut forecasts = BTreeMap::new();
        let mut metrics = Vec::new();
        for (target, outcome) in outcomes {
            match outcome {
                Ok(points) => {
                    if let Ok(model) = self.registry.lookup(&target) {
                        metrics.push(model.metrics());
                    }
                    forecasts.insert(target, points);
                }
                Err(e) => {
                    log::warn!("Target '{}' failed: {}", target, e);
                    failures.push(StageFailure::new("forecast", Some(&target), &e));
                }
            }
        }

        let sensors = summarize(
            &records,
            schema,
            anomalies.as_ref().map(|a| a.labels.as_slice()),
        );
        let elapsed_ms = (Utc::now() - started_at).num_milliseconds();

        log::info!(
            "Pipeline run {} finished in {} ms: {} targets forecast, {} failures",
            run_id,
            elapsed_ms,
            forecasts.len(),
            failures.len()
        );

        Ok(PipelineReport {
            run_id,
            started_at,
            elapsed_ms,
            normalize,
            record_count: records.len(),
            devices: device_ids(&records),
            anomalies,
            forecasts,
            metrics,
            sensors,
            failures,
        })
    }
}
