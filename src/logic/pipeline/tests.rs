//! End-to-end pipeline tests

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};

use super::*;
use crate::logic::config::{AnalyticsConfig, AnomalyConfig};
use crate::logic::error::AnalyticsError;
use crate::logic::records::RecordFilter;
use crate::logic::registry::ModelRegistry;

fn rows(n: usize) -> Vec<Vec<String>> {
    let start = Utc.with_ymd_and_hms(2024, 4, 2, 6, 0, 0).unwrap();
    let mut rows = vec![vec![
        "timestamp".to_string(),
        "deviceId".to_string(),
        "tempC".to_string(),
        "hum%".to_string(),
        "co2_ppm".to_string(),
        "quality".to_string(),
    ]];

    // Newest first, as a spreadsheet export often is
    for i in (0..n).rev() {
        let ts = start + Duration::minutes(i as i64);
        let device = if i % 2 == 0 { "esp32-a" } else { "esp32-b" };
        let temp = 21.0 + (i as f64 / 8.0).sin();
        rows.push(vec![
            ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            device.to_string(),
            format!("{:.2}", temp).replace('.', ","),
            format!("{:.1}", 50.0 + (i % 10) as f64),
            format!("{}", 600 + (i * 13) % 40),
            if i % 3 == 0 { "Good" } else { "Moderate" }.to_string(),
        ]);
    }
    rows
}

fn config() -> AnalyticsConfig {
    let mut config = AnalyticsConfig::quick();
    config.anomaly = AnomalyConfig {
        n_trees: 30,
        ..AnomalyConfig::for_columns(&["tempC", "hum%", "co2_ppm"])
    };
    config.forecast.forest.n_trees = 10;
    config.forecast.horizon = 12;
    config.targets = vec!["temperature".to_string(), "hum%".to_string()];
    config
}

#[test]
fn test_full_run() {
    let pipeline = AnalyticsPipeline::new(config()).unwrap();
    let report = pipeline.run_rows(&rows(100)).unwrap();

    assert!(report.is_complete(), "{:?}", report.failures);
    assert_eq!(report.record_count, 100);
    assert_eq!(report.normalize.rows_kept, 100);
    assert_eq!(report.devices, vec!["esp32-a".to_string(), "esp32-b".to_string()]);

    // Logical name resolved to its raw column
    assert_eq!(report.forecasts.keys().collect::<Vec<_>>(), vec!["hum%", "tempC"]);
    assert!(report.forecasts.values().all(|p| p.len() == 12));
    assert_eq!(report.metrics.len(), 2);
    assert_eq!(pipeline.registry().targets(), vec!["hum%".to_string(), "tempC".to_string()]);

    assert_eq!(report.anomaly_labels().len(), 100);
    assert_eq!(report.anomalies.as_ref().map(|a| a.anomaly_count()), Some(10));

    let temp = report.sensors.iter().find(|s| s.column == "tempC").unwrap();
    assert_eq!(temp.count, 100);
    assert!(temp.mean.is_some_and(|m| (m - 21.0).abs() < 1.0));
}

#[test]
fn test_parallel_and_sequential_agree() {
    let mut sequential = config();
    sequential.parallel = false;

    let a = AnalyticsPipeline::new(config()).unwrap().run_rows(&rows(80)).unwrap();
    let b = AnalyticsPipeline::new(sequential).unwrap().run_rows(&rows(80)).unwrap();

    assert_eq!(a.forecasts, b.forecasts);
    assert_eq!(a.anomaly_labels(), b.anomaly_labels());
}

#[test]
fn test_target_failure_does_not_abort_run() {
    let mut cfg = config();
    cfg.targets.push("pressure".to_string());

    let report = AnalyticsPipeline::new(cfg).unwrap().run_rows(&rows(60)).unwrap();
    assert_eq!(report.forecasts.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].target.as_deref(), Some("pressure"));
    assert_eq!(report.failures[0].kind, "unknown_column");
}

#[test]
fn test_anomaly_failure_is_recorded() {
    let mut cfg = config();
    cfg.anomaly.columns = vec!["pressure".to_string()];

    let report = AnalyticsPipeline::new(cfg).unwrap().run_rows(&rows(60)).unwrap();
    assert!(report.anomalies.is_none());
    assert_eq!(report.failures[0].stage, "anomaly");
    assert_eq!(report.failures[0].kind, "no_usable_features");
    assert_eq!(report.forecasts.len(), 2);
}

#[test]
fn test_device_filter() {
    let pipeline = AnalyticsPipeline::new(config())
        .unwrap()
        .with_filter(RecordFilter::new().device("esp32-a"));
    let report = pipeline.run_rows(&rows(100)).unwrap();

    assert_eq!(report.record_count, 50);
    assert_eq!(report.devices, vec!["esp32-a".to_string()]);
}

#[test]
fn test_filter_to_nothing_is_empty_dataset() {
    let pipeline = AnalyticsPipeline::new(config())
        .unwrap()
        .with_filter(RecordFilter::new().device("missing"));
    assert!(matches!(pipeline.run_rows(&rows(20)), Err(AnalyticsError::EmptyDataset)));
}

#[test]
fn test_shared_registry() {
    let registry = Arc::new(ModelRegistry::new());
    let pipeline = AnalyticsPipeline::new(config()).unwrap().with_registry(Arc::clone(&registry));
    pipeline.run_rows(&rows(60)).unwrap();
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_invalid_config_rejected() {
    let mut cfg = config();
    cfg.features.lag_depth = 0;
    assert!(AnalyticsPipeline::new(cfg).is_err());
}

#[test]
fn test_report_serializes() {
    let report = AnalyticsPipeline::new(config()).unwrap().run_rows(&rows(40)).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert!(json["run_id"].is_string());
    assert_eq!(json["forecasts"]["tempC"].as_array().map(|a| a.len()), Some(12));
}
