//! Logic Module - Analytics Engines
//!
//! Stages run in order: records -> features -> {anomaly, forecast}.
//! Every stage takes its input by reference or by value and returns a new
//! sequence; nothing is mutated across stages.

pub mod config;
pub mod error;

pub mod records;
pub mod features;
pub mod anomaly;
pub mod model;
pub mod registry;
pub mod forecast;

pub mod pipeline;
pub mod export;
