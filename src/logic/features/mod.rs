//! Features Module - Feature Engineering Engine
//!
//! Lags, trailing rolling statistics and calendar features for a single
//! target column, described by a hashed `FeatureLayout`.

pub mod layout;
pub mod row;
pub mod calendar;
pub mod stats;
pub mod builder;

#[cfg(test)]
mod tests;

// Re-export common types
pub use builder::FeatureBuilder;
pub use calendar::CalendarFeatures;
pub use layout::{FeatureLayout, FEATURE_LAYOUT_VERSION};
pub use row::FeatureRow;
