//! Integration tests for the feature builder

use chrono::{DateTime, Duration, TimeZone, Utc};

use super::*;
use crate::logic::error::AnalyticsError;
use crate::logic::records::SensorRecord;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap()
}

fn series(values: &[Option<f64>]) -> Vec<SensorRecord> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            SensorRecord::new(start() + Duration::minutes(i as i64), "esp32").with_numeric("tempC", *v)
        })
        .collect()
}

fn ramp(n: usize) -> Vec<SensorRecord> {
    let values: Vec<_> = (0..n).map(|i| Some(i as f64)).collect();
    series(&values)
}

#[test]
fn test_output_length_is_len_minus_warmup() {
    let records = ramp(30);
    for (k, w) in [(1, 1), (3, 5), (5, 3), (10, 10), (2, 7)] {
        let builder = FeatureBuilder::new(k, w).unwrap();
        let rows = builder.build(&records, "tempC").unwrap();
        assert_eq!(rows.len(), 30 - k.max(w), "k={} w={}", k, w);
    }
}

#[test]
fn test_lags_and_rolling_values() {
    let builder = FeatureBuilder::new(3, 4).unwrap();
    let rows = builder.build(&ramp(10), "tempC").unwrap();

    // First row sits at position 4
    let first = &rows[0];
    assert_eq!(first.label, Some(4.0));
    assert_eq!(first.lags(), &[3.0, 2.0, 1.0]);
    assert_eq!(first.lag(1), Some(3.0));
    assert_eq!(first.lag(4), None);
    // mean of [0, 1, 2, 3]
    assert!((first.rolling_mean() - 1.5).abs() < 1e-12);
    assert!((first.rolling_std() - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
    assert_eq!(first.timestamp, start() + Duration::minutes(4));
}

#[test]
fn test_rolling_window_never_sees_current_value() {
    let builder = FeatureBuilder::new(2, 5).unwrap();
    let base = ramp(12);
    let before = builder.build(&base, "tempC").unwrap();

    // Inject a sentinel at the last position
    let mut poisoned = base.clone();
    let last = poisoned.len() - 1;
    poisoned[last] = poisoned[last].clone().with_numeric("tempC", Some(1.0e9));
    let after = builder.build(&poisoned, "tempC").unwrap();

    let b = before.last().unwrap();
    let a = after.last().unwrap();
    assert_eq!(b.rolling_mean(), a.rolling_mean());
    assert_eq!(b.rolling_std(), a.rolling_std());
    assert_eq!(b.lags(), a.lags());
    assert_eq!(a.label, Some(1.0e9));
}

#[test]
fn test_missing_values_drop_dependent_rows() {
    let mut values: Vec<_> = (0..20).map(|i| Some(i as f64)).collect();
    values[10] = None;
    let builder = FeatureBuilder::new(2, 3).unwrap();
    let rows = builder.build(&series(&values), "tempC").unwrap();

    // Positions 10 (label), 11, 12 (lags/window), 13 (window) are excluded
    let full = 20 - 3;
    assert_eq!(rows.len(), full - 4);
    assert!(rows.iter().all(|r| r.values.iter().all(|v| v.is_finite())));
    let stamps: Vec<_> = rows.iter().map(|r| r.timestamp).collect();
    assert!(!stamps.contains(&(start() + Duration::minutes(13))));
    assert!(stamps.contains(&(start() + Duration::minutes(14))));
}

#[test]
fn test_insufficient_history_is_empty_not_error() {
    let builder = FeatureBuilder::new(5, 5).unwrap();
    assert!(builder.build(&ramp(5), "tempC").unwrap().is_empty());
    assert!(builder.build(&[], "tempC").unwrap().is_empty());
}

#[test]
fn test_unknown_target_column() {
    let builder = FeatureBuilder::new(2, 2).unwrap();
    let err = builder.build(&ramp(10), "co2_ppm").unwrap_err();
    assert!(matches!(err, AnalyticsError::UnknownColumn(c) if c == "co2_ppm"));
}

#[test]
fn test_invalid_parameters() {
    assert!(FeatureBuilder::new(0, 3).is_err());
    assert!(FeatureBuilder::new(3, 0).is_err());
}

#[test]
fn test_build_is_deterministic() {
    let builder = FeatureBuilder::new(4, 6).unwrap();
    let records = ramp(40);
    let a = builder.build(&records, "tempC").unwrap();
    let b = builder.build(&records, "tempC").unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_constant_series_scenario() {
    let v = 21.5;
    let records = series(&vec![Some(v); 20]);
    let builder = FeatureBuilder::new(5, 5).unwrap();
    let rows = builder.build(&records, "tempC").unwrap();

    assert_eq!(rows.len(), 15);
    for row in &rows {
        assert!(row.lags().iter().all(|l| *l == v));
        assert_eq!(row.rolling_mean(), v);
        assert_eq!(row.rolling_std(), 0.0);
    }
}

#[test]
fn test_rows_carry_layout_hash() {
    let builder = FeatureBuilder::new(3, 3).unwrap();
    let layout = builder.layout("tempC");
    let rows = builder.build(&ramp(8), "tempC").unwrap();
    assert!(rows.iter().all(|r| r.layout_hash == layout.hash));
    assert_eq!(rows[0].values.len(), layout.len());
    assert_eq!(rows[0].get(&layout, "tempC_lag_2"), rows[0].lag(2));
}

#[test]
fn test_next_row_advances_one_step() {
    let builder = FeatureBuilder::new(3, 4).unwrap();
    let history = [1.0, 2.0, 3.0, 4.0, 5.0];
    let last = start();
    let row = builder
        .next_row("tempC", &history, last, Duration::minutes(1), "esp32")
        .unwrap();

    assert_eq!(row.label, None);
    assert_eq!(row.lags(), &[5.0, 4.0, 3.0]);
    assert!((row.rolling_mean() - 3.5).abs() < 1e-12);
    assert_eq!(row.timestamp, last + Duration::minutes(1));

    let err = builder
        .next_row("tempC", &history[..3], last, Duration::minutes(1), "esp32")
        .unwrap_err();
    assert!(matches!(err, AnalyticsError::InsufficientData { required: 4, actual: 3 }));
}
