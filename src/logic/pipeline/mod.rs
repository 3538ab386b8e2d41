//! Pipeline Module - End-to-end Batch Analytics

pub mod runner;
pub mod summary;

#[cfg(test)]
mod tests;

// Re-export common types
pub use runner::{AnalyticsPipeline, PipelineReport, StageFailure};
pub use summary::{device_ids, summarize, PeriodStats, SensorSummary};
