//! Sensor Insight Core - Library Entry Point
//!
//! Batch analytics over IoT sensor readings: record normalization, lag /
//! rolling / calendar features, isolation-forest anomaly labels and
//! autoregressive multi-step forecasts.
//!
//! ## Layout
//! - `logic/records/` - Raw rows -> typed `SensorRecord`s
//! - `logic/features/` - Feature layout + builder
//! - `logic/anomaly/` - Isolation forest + detector
//! - `logic/model/` - Regressors, scaler, split, metrics
//! - `logic/registry/` - Trained model registry
//! - `logic/forecast/` - Training + iterative forecasting
//! - `logic/pipeline/` - Orchestration across targets + per-sensor summary
//! - `logic/export.rs` - JSONL report export

pub mod constants;
pub mod logic;

pub use logic::anomaly::{AnomalyDetector, AnomalyLabel};
pub use logic::config::AnalyticsConfig;
pub use logic::error::{AnalyticsError, AnalyticsResult};
pub use logic::features::{FeatureBuilder, FeatureLayout, FeatureRow};
pub use logic::forecast::{ForecastEngine, ForecastPoint};
pub use logic::pipeline::{AnalyticsPipeline, PipelineReport};
pub use logic::records::{normalize_rows, SensorRecord, SensorSchema};
pub use logic::registry::{ModelRegistry, TrainedModel};
