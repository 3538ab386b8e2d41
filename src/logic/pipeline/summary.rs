//! Per-sensor descriptive summary
//!
//! Count, central tendency, spread and anomaly share, plus per-hour and
//! per-weekday tables (Monday = 0). The lowest and highest hours are read
//! off the hourly means.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Timelike};
use serde::{Deserialize, Serialize};

use crate::logic::anomaly::AnomalyLabel;
use crate::logic::features::stats::{mean, sample_std};
use crate::logic::records::{SensorRecord, SensorSchema};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSummary {
    pub sensor: String,
    pub column: String,
    pub unit: String,
    pub count: usize,
    pub missing: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub std: Option<f64>,
    /// Flagged rows that carry a value for this sensor
    pub anomaly_count: usize,
    pub anomaly_percent: f64,
    pub lowest_hour: Option<u32>,
    pub highest_hour: Option<u32>,
    pub by_hour: Vec<PeriodStats>,
    pub by_weekday: Vec<PeriodStats>,
}

/// Readings that fall in one hour of day or one day of week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodStats {
    pub period: u32,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl PeriodStats {
    fn from_values(period: u32, values: &[f64]) -> Self {
        Self {
            period,
            count: values.len(),
            mean: mean(values).unwrap_or(0.0),
            std: sample_std(values),
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

fn period_table(groups: BTreeMap<u32, Vec<f64>>) -> Vec<PeriodStats> {
    groups
        .iter()
        .map(|(period, values)| PeriodStats::from_values(*period, values))
        .collect()
}

/// One summary per numeric sensor of the schema that appears in `records`
pub fn summarize(
    records: &[SensorRecord],
    schema: &SensorSchema,
    labels: Option<&[AnomalyLabel]>,
) -> Vec<SensorSummary> {
    schema
        .sensors
        .iter()
        .filter(|s| !schema.is_categorical(&s.column))
        .filter(|s| records.iter().any(|r| r.has_numeric(&s.column)))
        .map(|s| {
            let flagged = |i: usize| {
                labels
                    .and_then(|l| l.get(i))
                    .is_some_and(|l| l.is_anomaly)
            };

            let mut values = Vec::new();
            let mut anomaly_count = 0usize;
            let mut hourly: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
            let mut weekly: BTreeMap<u32, Vec<f64>> = BTreeMap::new();

            for (i, record) in records.iter().enumerate() {
                let Some(v) = record.value(&s.column) else { continue };
                values.push(v);
                if flagged(i) {
                    anomaly_count += 1;
                }
                hourly.entry(record.timestamp.hour()).or_default().push(v);
                weekly
                    .entry(record.timestamp.weekday().num_days_from_monday())
                    .or_default()
                    .push(v);
            }

            let count = values.len();
            let by_hour = period_table(hourly);
            let (lowest_hour, highest_hour) = extreme_hours(&by_hour);

            SensorSummary {
                sensor: s.name.clone(),
                column: s.column.clone(),
                unit: s.unit.clone(),
                count,
                missing: records.len() - count,
                mean: mean(&values),
                median: median(&values),
                min: values.iter().copied().reduce(f64::min),
                max: values.iter().copied().reduce(f64::max),
                std: (count > 0).then(|| sample_std(&values)),
                anomaly_count,
                anomaly_percent: if count > 0 {
                    anomaly_count as f64 / count as f64 * 100.0
                } else {
                    0.0
                },
                lowest_hour,
                highest_hour,
                by_hour,
                by_weekday: period_table(weekly),
            }
        })
        .collect()
}

/// Distinct device ids, sorted
pub fn device_ids(records: &[SensorRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.device_id.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

fn extreme_hours(by_hour: &[PeriodStats]) -> (Option<u32>, Option<u32>) {
    let averages: Vec<(u32, f64)> = by_hour.iter().map(|p| (p.period, p.mean)).collect();

    // Earliest hour wins ties
    let pick = |better: Ordering| {
        averages
            .iter()
            .fold(None::<(u32, f64)>, |best, &(h, avg)| match best {
                Some((_, b)) if avg.total_cmp(&b) != better => best,
                _ => Some((h, avg)),
            })
            .map(|(h, _)| h)
    };

    (pick(Ordering::Less), pick(Ordering::Greater))
}
