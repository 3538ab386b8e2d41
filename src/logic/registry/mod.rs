//! Registry Module - Trained Models by Target

pub mod entry;
pub mod store;

#[cfg(test)]
mod tests;

// Re-export common types
pub use entry::{FittedModel, ForecastSeed, TargetMetrics, TrainedModel};
pub use store::ModelRegistry;
