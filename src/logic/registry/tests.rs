//! Registry tests

use std::sync::Arc;
use std::thread;

use chrono::{Duration, TimeZone, Utc};

use super::*;
use crate::logic::config::{ForecastConfig, RandomForestConfig};
use crate::logic::error::AnalyticsError;
use crate::logic::features::FeatureBuilder;
use crate::logic::forecast::ForecastEngine;
use crate::logic::model::ModelKind;
use crate::logic::records::SensorRecord;

fn trained(target: &str, offset: f64) -> TrainedModel {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let records: Vec<SensorRecord> = (0..40)
        .map(|i| {
            SensorRecord::new(start + Duration::minutes(i), "esp32")
                .with_numeric(target, Some(offset + (i % 7) as f64))
        })
        .collect();

    let config = ForecastConfig {
        forest: RandomForestConfig {
            n_trees: 5,
            ..Default::default()
        },
        ..Default::default()
    };
    ForecastEngine::new(FeatureBuilder::new(3, 3).unwrap(), config)
        .unwrap()
        .train(&records, target)
        .unwrap()
}

#[test]
fn test_register_and_lookup() {
    let registry = ModelRegistry::new();
    assert!(registry.is_empty());
    assert!(registry.register(trained("tempC", 20.0)).is_none());

    let model = registry.lookup("tempC").unwrap();
    assert_eq!(model.target, "tempC");
    assert_eq!(model.selected, ModelKind::RandomForest);
    assert_eq!(registry.len(), 1);
    assert!(registry.contains("tempC"));
}

#[test]
fn test_lookup_unknown_target() {
    let registry = ModelRegistry::new();
    let err = registry.lookup("co2_ppm").unwrap_err();
    assert!(matches!(err, AnalyticsError::UnknownTarget(t) if t == "co2_ppm"));
}

#[test]
fn test_register_replaces_and_old_arc_survives() {
    let registry = ModelRegistry::new();
    registry.register(trained("tempC", 20.0));
    let old = registry.lookup("tempC").unwrap();

    let replaced = registry.register(trained("tempC", 500.0));
    assert!(replaced.is_some());
    assert_eq!(registry.len(), 1);

    let new = registry.lookup("tempC").unwrap();
    assert!(!Arc::ptr_eq(&old, &new));
    assert!(old.seed.history.iter().all(|v| *v < 100.0));
    assert!(new.seed.history.iter().all(|v| *v >= 500.0));
}

#[test]
fn test_remove_targets_metrics() {
    let registry = ModelRegistry::new();
    registry.register(trained("tempC", 20.0));
    registry.register(trained("hum%", 50.0));

    assert_eq!(registry.targets(), vec!["hum%".to_string(), "tempC".to_string()]);

    let metrics = registry.metrics();
    assert_eq!(metrics.len(), 2);
    assert_eq!(metrics[0].target, "hum%");
    assert!(metrics[0].models.contains_key(&ModelKind::Linear));
    assert!(metrics[0].models.contains_key(&ModelKind::RandomForest));

    assert!(registry.remove("hum%").is_some());
    assert!(registry.remove("hum%").is_none());
    assert_eq!(registry.targets(), vec!["tempC".to_string()]);
}

#[test]
fn test_concurrent_readers_and_writer() {
    let registry = Arc::new(ModelRegistry::new());
    registry.register(trained("tempC", 20.0));
    let replacement = trained("tempC", 30.0);

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for _ in 0..100 {
                    assert!(registry.lookup("tempC").is_ok());
                }
            })
        })
        .collect();

    registry.register(replacement);
    for r in readers {
        r.join().unwrap();
    }
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_trained_model_serializes() {
    let model = trained("tempC", 20.0);
    let json = serde_json::to_string(&model).unwrap();
    let back: TrainedModel = serde_json::from_str(&json).unwrap();
    assert_eq!(back.target, model.target);
    assert_eq!(back.layout, model.layout);
    assert_eq!(back.models.len(), 2);
}
