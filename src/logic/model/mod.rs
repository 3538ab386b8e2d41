//! Model Module - Regression Models for Forecasting
//!
//! Scaling, splitting, two regressor families and their metrics.
//! Forecasting only talks to models through `Regressor`.

pub mod metrics;
pub mod scaler;
pub mod split;
pub mod linear;
pub mod tree;
pub mod forest;
pub mod regressor;

// Re-export common types
pub use forest::RandomForest;
pub use linear::LinearModel;
pub use metrics::ModelMetrics;
pub use regressor::{FittedRegressor, ModelKind, Regressor};
pub use scaler::StandardScaler;
pub use split::{min_rows, train_test_split, SplitIndices};
