//! Analytics Configuration
//!
//! Loaded from a JSON file (every field optional), then overridden from the
//! environment, then validated. Defaults live in `constants.rs`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::logic::error::{AnalyticsError, AnalyticsResult};
use crate::logic::records::SensorSchema;

// ============================================================================
// FEATURES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Number of lag features (k)
    pub lag_depth: usize,
    /// Trailing window for rolling mean/std (w)
    pub window_size: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            lag_depth: DEFAULT_LAG_DEPTH,
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

impl FeatureConfig {
    /// Five lags over a five-sample window
    pub fn compact() -> Self {
        Self {
            lag_depth: 5,
            window_size: 5,
        }
    }
}

// ============================================================================
// ANOMALY DETECTION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// Numeric columns scored together
    pub columns: Vec<String>,
    /// Expected share of outliers, in (0, 1)
    pub contamination: f64,
    pub n_trees: usize,
    /// Rows drawn (without replacement) per tree
    pub sample_size: usize,
    pub seed: u64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            columns: DEFAULT_ANOMALY_COLUMNS.iter().map(|c| c.to_string()).collect(),
            contamination: DEFAULT_CONTAMINATION,
            n_trees: DEFAULT_ISOLATION_TREES,
            sample_size: DEFAULT_ISOLATION_SAMPLE,
            seed: DEFAULT_SEED,
        }
    }
}

impl AnomalyConfig {
    pub fn for_columns(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }
}

// ============================================================================
// FORECASTING
// ============================================================================

/// Which fitted regressor drives the forecast loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelChoice {
    Linear,
    RandomForest,
    /// Lowest held-out MSE
    Best,
}

/// Spacing of forecast timestamps
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepSize {
    Seconds(i64),
    /// Mean spacing of the training records, 60 s when undefined
    AverageInterval,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomForestConfig {
    pub n_trees: usize,
    /// `None` grows trees until leaves are pure or too small
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Features tried per split; `None` = all
    pub max_features: Option<usize>,
}

impl Default for RandomForestConfig {
    fn default() -> Self {
        Self {
            n_trees: DEFAULT_FOREST_TREES,
            max_depth: None,
            min_samples_split: 2,
            max_features: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub horizon: usize,
    /// Held-out share for evaluation, in (0, 1)
    pub test_fraction: f64,
    pub seed: u64,
    pub model: ModelChoice,
    pub step: StepSize,
    pub forest: RandomForestConfig,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon: DEFAULT_HORIZON,
            test_fraction: DEFAULT_TEST_FRACTION,
            seed: DEFAULT_SEED,
            model: ModelChoice::RandomForest,
            step: StepSize::AverageInterval,
            forest: RandomForestConfig::default(),
        }
    }
}

// ============================================================================
// ANALYTICS CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub schema: SensorSchema,
    pub features: FeatureConfig,
    pub anomaly: AnomalyConfig,
    pub forecast: ForecastConfig,
    /// Raw columns (or logical sensor names) to forecast
    pub targets: Vec<String>,
    /// Run per-target pipelines on the rayon pool
    pub parallel: bool,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            schema: SensorSchema::default(),
            features: FeatureConfig::default(),
            anomaly: AnomalyConfig::default(),
            forecast: ForecastConfig::default(),
            targets: DEFAULT_TARGETS.iter().map(|t| t.to_string()).collect(),
            parallel: true,
        }
    }
}

impl AnalyticsConfig {
    /// Lighter setup: compact features, four scored columns
    pub fn quick() -> Self {
        Self {
            features: FeatureConfig::compact(),
            anomaly: AnomalyConfig::for_columns(&["tempC", "hum%", "co2_ppm", "ldr_raw"]),
            ..Default::default()
        }
    }

    /// Read a JSON config file; missing fields take defaults
    pub fn from_file(path: &Path) -> AnalyticsResult<Self> {
        let data = fs::read(path)?;
        let config: Self = serde_json::from_slice(&data)?;
        Ok(config)
    }

    /// Override fields from `SENSOR_*` environment variables
    pub fn apply_env(mut self) -> Self {
        if let Some(k) = env_parsed(ENV_LAG_DEPTH) {
            self.features.lag_depth = k;
        }
        if let Some(w) = env_parsed(ENV_WINDOW_SIZE) {
            self.features.window_size = w;
        }
        if let Some(c) = env_parsed(ENV_CONTAMINATION) {
            self.anomaly.contamination = c;
        }
        if let Some(h) = env_parsed(ENV_HORIZON) {
            self.forecast.horizon = h;
        }
        if let Some(seed) = env_parsed::<u64>(ENV_SEED) {
            self.anomaly.seed = seed;
            self.forecast.seed = seed;
        }
        if let Some(targets) = env_list(ENV_TARGETS) {
            self.targets = targets;
        }
        self
    }

    /// File (if given) -> environment -> validation
    pub fn load(path: Option<&Path>) -> AnalyticsResult<Self> {
        let base = match path {
            Some(p) => {
                log::info!("Loading analytics config from {}", p.display());
                Self::from_file(p)?
            }
            None => Self::default(),
        };

        let config = base.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AnalyticsResult<()> {
        let invalid = |msg: &str| Err(AnalyticsError::InvalidConfig(msg.to_string()));

        if self.features.lag_depth == 0 {
            return invalid("features.lag_depth must be >= 1");
        }
        if self.features.window_size == 0 {
            return invalid("features.window_size must be >= 1");
        }
        if !(self.anomaly.contamination > 0.0 && self.anomaly.contamination < 1.0) {
            return invalid("anomaly.contamination must be in (0, 1)");
        }
        if self.anomaly.n_trees == 0 || self.anomaly.sample_size == 0 {
            return invalid("anomaly.n_trees and anomaly.sample_size must be >= 1");
        }
        if !(self.forecast.test_fraction > 0.0 && self.forecast.test_fraction < 1.0) {
            return invalid("forecast.test_fraction must be in (0, 1)");
        }
        if self.forecast.forest.n_trees == 0 {
            return invalid("forecast.forest.n_trees must be >= 1");
        }
        if let StepSize::Seconds(s) = self.forecast.step {
            if s <= 0 {
                return invalid("forecast.step seconds must be > 0");
            }
        }
        Ok(())
    }
}

/// Default config location: <config dir>/sensor-insight/config.json
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sensor-insight")
        .join("config.json")
}

// ============================================================================
// TESTS
// ============================================================================
