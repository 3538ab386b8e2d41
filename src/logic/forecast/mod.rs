//! Forecast Module - Autoregressive Multi-step Forecasting

pub mod engine;
pub mod point;


// Re-export common types
pub use engine::{forecast_from, forecast_trace, ForecastEngine};
pub use point::{ForecastPoint, ForecastStep};
