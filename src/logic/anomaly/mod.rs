//! Anomaly Module - Multivariate Outlier Detection
//!
//! Seeded isolation forest plus a contamination-based cutoff.

pub mod forest;
pub mod threshold;
pub mod detector;


// Re-export common types
pub use detector::{AnomalyDetector, AnomalyLabel, AnomalyReport, FeatureView, NumericSource};
pub use forest::IsolationForest;
pub use threshold::{ContaminationThreshold, ThresholdStats};
