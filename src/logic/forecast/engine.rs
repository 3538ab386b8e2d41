//! Forecast Engine
//!
//! Training: build feature rows, split, scale, fit both regressor families,
//! evaluate on the held-out rows, select one and register the result.
//!
//! Forecasting starts from the most recent feature row and feeds each
//! prediction back as the newest value: lags shift, rolling statistics are
//! recomputed over history ++ predictions, and the calendar advances one
//! step.

use std::sync::Arc;

use chrono::Utc;

use super::point::{ForecastPoint, ForecastStep};
use crate::constants::DEFAULT_STEP_SECONDS;
use crate::logic::config::{ForecastConfig, ModelChoice, StepSize};
use crate::logic::error::{AnalyticsError, AnalyticsResult};
use crate::logic::features::{FeatureBuilder, FeatureRow};
use crate::logic::model::split::take;
use crate::logic::model::{
    min_rows, train_test_split, FittedRegressor, LinearModel, ModelKind, ModelMetrics, RandomForest, Regressor,
    StandardScaler,
};
use crate::logic::records::record::{average_interval_secs, column_values};
use crate::logic::records::SensorRecord;
use crate::logic::registry::{FittedModel, ForecastSeed, ModelRegistry, TrainedModel};

#[derive(Debug, Clone)]
pub struct ForecastEngine {
    builder: FeatureBuilder,
    config: ForecastConfig,
}

impl ForecastEngine {
    pub fn new(builder: FeatureBuilder, config: ForecastConfig) -> AnalyticsResult<Self> {
        if !(config.test_fraction > 0.0 && config.test_fraction < 1.0) {
            return Err(AnalyticsError::InvalidConfig(format!(
                "test_fraction must be in (0, 1), got {}",
                config.test_fraction
            )));
        }
        if let StepSize::Seconds(s) = config.step {
            if s <= 0 {
                return Err(AnalyticsError::InvalidConfig("step seconds must be > 0".into()));
            }
        }
        Ok(Self { builder, config })
    }

    pub fn builder(&self) -> &FeatureBuilder {
        &self.builder
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Fit models for `target` without registering them
    pub fn train(&self, records: &[SensorRecord], target: &str) -> AnalyticsResult<TrainedModel> {
        let layout = self.builder.layout(target);
        let rows = self.builder.build(records, target)?;
        let (features, labels): (Vec<Vec<f64>>, Vec<f64>) = rows
            .iter()
            .filter_map(|r| r.label.map(|y| (r.values.clone(), y)))
            .unzip();

        let required = min_rows(self.config.test_fraction);
        if features.len() < required {
            return Err(AnalyticsError::InsufficientData {
                required,
                actual: features.len(),
            });
        }
        let last_row = rows.last().ok_or(AnalyticsError::EmptyDataset)?;

        let split = train_test_split(features.len(), self.config.test_fraction, self.config.seed)?;
        let scaler = StandardScaler::fit(&take(&features, &split.train))?;
        let x_train = scaler.transform_all(&take(&features, &split.train));
        let x_test = scaler.transform_all(&take(&features, &split.test));
        let y_train = take(&labels, &split.train);
        let y_test = take(&labels, &split.test);

        let linear = FittedRegressor::Linear(LinearModel::fit(&x_train, &y_train)?);
        let forest = FittedRegressor::RandomForest(RandomForest::fit(
            &x_train,
            &y_train,
            &self.config.forest,
            self.config.seed,
        )?);

        let models: Vec<FittedModel> = [linear, forest]
            .into_iter()
            .map(|regressor| {
                let metrics = ModelMetrics::evaluate(&y_test, &regressor.predict_many(&x_test));
                FittedModel { regressor, metrics }
            })
            .collect();

        let selected = select_model(self.config.model, &models);
        for m in &models {
            log::info!(
                "Trained {} for '{}': mse={:.4} mae={:.4}",
                m.kind(),
                target,
                m.metrics.mse,
                m.metrics.mae
            );
        }

        let seed = self.forecast_seed(records, target, last_row)?;

        Ok(TrainedModel {
            target: target.to_string(),
            layout,
            scaler,
            models,
            selected,
            train_rows: split.train.len(),
            test_rows: split.test.len(),
            trained_at: Utc::now(),
            seed,
        })
    }

    /// Train and register; returns the registered model
    pub fn train_and_register(
        &self,
        registry: &ModelRegistry,
        records: &[SensorRecord],
        target: &str,
    ) -> AnalyticsResult<Arc<TrainedModel>> {
        let model = self.train(records, target)?;
        registry.register(model);
        registry.lookup(target)
    }

    /// `horizon` points for a registered target
    pub fn forecast(
        &self,
        registry: &ModelRegistry,
        target: &str,
        horizon: usize,
    ) -> AnalyticsResult<Vec<ForecastPoint>> {
        let model = registry.lookup(target)?;
        forecast_from(&model, horizon)
    }

    /// Seed from the last emitted row and the positions that produced it
    fn forecast_seed(
        &self,
        records: &[SensorRecord],
        target: &str,
        row: &FeatureRow,
    ) -> AnalyticsResult<ForecastSeed> {
        let warmup = self.builder.layout(target).warmup();
        let series = column_values(records, target);
        let history: Vec<f64> = series[row.position - warmup..row.position]
            .iter()
            .flatten()
            .copied()
            .collect();
        if history.len() < warmup {
            return Err(AnalyticsError::InsufficientData {
                required: warmup,
                actual: history.len(),
            });
        }
        let last = records.last().ok_or(AnalyticsError::EmptyDataset)?;

        let step_seconds = match self.config.step {
            StepSize::Seconds(s) => s,
            StepSize::AverageInterval => average_interval_secs(records)
                .map(|s| s.round() as i64)
                .filter(|s| *s > 0)
                .unwrap_or(DEFAULT_STEP_SECONDS),
        };

        Ok(ForecastSeed {
            row: row.clone(),
            history,
            last_timestamp: last.timestamp,
            step_seconds,
            device_id: last.device_id.clone(),
        })
    }
}

fn select_model(choice: ModelChoice, models: &[FittedModel]) -> ModelKind {
    match choice {
        ModelChoice::Linear => ModelKind::Linear,
        ModelChoice::RandomForest => ModelKind::RandomForest,
        ModelChoice::Best => models
            .iter()
            .min_by(|a, b| a.metrics.mse.total_cmp(&b.metrics.mse))
            .map(|m| m.kind())
            .unwrap_or(ModelKind::RandomForest),
    }
}

/// Iterated one-step-ahead forecast from a trained model's seed
pub fn forecast_from(model: &TrainedModel, horizon: usize) -> AnalyticsResult<Vec<ForecastPoint>> {
    Ok(forecast_trace(model, horizon)?.into_iter().map(|s| s.point).collect())
}

/// Like `forecast_from`, keeping the feature row each point was predicted from
pub fn forecast_trace(model: &TrainedModel, horizon: usize) -> AnalyticsResult<Vec<ForecastStep>> {
    if horizon == 0 {
        return Ok(Vec::new());
    }

    let layout = &model.layout;
    let builder = FeatureBuilder::new(layout.lag_depth, layout.window_size)?;
    let seed = &model.seed;
    let step = seed.step();

    let mut series = seed.history.clone();
    let mut current = seed.row.clone();
    let mut steps = Vec::with_capacity(horizon);

    for i in 1..=horizon {
        let value = model.predict(&current)?;
        series.push(value);

        let point = ForecastPoint {
            timestamp: seed.last_timestamp + step * i as i32,
            value,
            target: layout.target.clone(),
            model: model.selected,
            step: i,
        };

        if i == horizon {
            steps.push(ForecastStep { input: current, point });
            break;
        }

        let mut next = builder.next_row(&layout.target, &series, current.timestamp, step, &seed.device_id)?;
        next.position = current.position + 1;
        steps.push(ForecastStep { input: current, point });
        current = next;
    }

    log::debug!("Forecast {} steps for '{}' with {}", horizon, layout.target, model.selected);
    Ok(steps)
}
