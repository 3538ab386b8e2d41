//! Record Normalizer
//!
//! Turns a header row plus data rows of strings into a timestamp-sorted
//! `SensorRecord` sequence.
//!
//! ## Rules
//! - Row shorter than the header -> skipped
//! - Unparsable timestamp -> skipped
//! - Categorical column -> passed through, then label-encoded per batch
//! - Any other column -> decimal (`,` or `.`), `None` if unparsable
//! - Stable sort by timestamp: duplicates keep arrival order

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::record::{CategoricalValue, SensorRecord};
use super::schema::SensorSchema;
use super::timestamp::{parse_decimal, parse_timestamp};
use crate::logic::error::{AnalyticsError, AnalyticsResult};

/// Counters collected while normalizing one batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeStats {
    pub rows_seen: usize,
    pub rows_kept: usize,
    pub skipped_short: usize,
    pub skipped_timestamp: usize,
    pub null_cells: usize,
}

#[derive(Debug, Clone)]
pub struct NormalizedBatch {
    pub records: Vec<SensorRecord>,
    pub stats: NormalizeStats,
}

/// Normalize raw rows (first row = header) against a schema.
///
/// Fails only with `EmptyDataset` when no row survives.
pub fn normalize_rows<S: AsRef<str>>(
    rows: &[Vec<S>],
    schema: &SensorSchema,
) -> AnalyticsResult<NormalizedBatch> {
    let Some((header_row, data_rows)) = rows.split_first() else {
        log::warn!("Normalizer received no rows (missing header)");
        return Err(AnalyticsError::EmptyDataset);
    };

    let header: Vec<&str> = header_row.iter().map(|h| h.as_ref().trim()).collect();
    let ts_idx = header.iter().position(|h| *h == schema.timestamp_column);
    let device_idx = header.iter().position(|h| *h == schema.device_column);

    if ts_idx.is_none() {
        log::warn!(
            "Header has no '{}' column; every row will be rejected",
            schema.timestamp_column
        );
    }

    let mut stats = NormalizeStats::default();
    let mut records = Vec::with_capacity(data_rows.len());

    for row in data_rows {
        stats.rows_seen += 1;

        if row.len() < header.len() {
            stats.skipped_short += 1;
            continue;
        }

        let timestamp = match ts_idx.and_then(|i| parse_timestamp(row[i].as_ref())) {
            Some(ts) => ts,
            None => {
                stats.skipped_timestamp += 1;
                continue;
            }
        };

        let device_id = device_idx
            .map(|i| row[i].as_ref().trim())
            .unwrap_or_default();
        let mut record = SensorRecord::new(timestamp, device_id);

        for (i, column) in header.iter().enumerate() {
            if Some(i) == ts_idx || Some(i) == device_idx {
                continue;
            }

            let cell = row[i].as_ref();
            if schema.is_categorical(column) {
                record
                    .categorical
                    .insert(column.to_string(), CategoricalValue::new(cell));
            } else {
                let value = parse_decimal(cell);
                if value.is_none() {
                    stats.null_cells += 1;
                }
                record.numeric.insert(column.to_string(), value);
            }
        }

        records.push(record);
    }

    if records.is_empty() {
        log::warn!(
            "No usable rows: {} seen, {} short, {} bad timestamp",
            stats.rows_seen,
            stats.skipped_short,
            stats.skipped_timestamp
        );
        return Err(AnalyticsError::EmptyDataset);
    }

    // sort_by_key is stable
    records.sort_by_key(|r| r.timestamp);
    encode_categoricals(&mut records);

    stats.rows_kept = records.len();
    log::info!(
        "Normalized {} records ({} short, {} bad timestamp, {} null cells)",
        stats.rows_kept,
        stats.skipped_short,
        stats.skipped_timestamp,
        stats.null_cells
    );

    Ok(NormalizedBatch { records, stats })
}

/// Label-encode every categorical column: sorted distinct values -> index
fn encode_categoricals(records: &mut [SensorRecord]) {
    let mut classes: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for record in records.iter() {
        for (column, value) in &record.categorical {
            classes
                .entry(column.clone())
                .or_default()
                .insert(value.raw.clone());
        }
    }

    let lookup: BTreeMap<&str, BTreeMap<&str, u32>> = classes
        .iter()
        .map(|(column, values)| {
            let index = values
                .iter()
                .enumerate()
                .map(|(i, v)| (v.as_str(), i as u32))
                .collect();
            (column.as_str(), index)
        })
        .collect();

    for record in records.iter_mut() {
        for (column, value) in record.categorical.iter_mut() {
            value.encoded = lookup
                .get(column.as_str())
                .and_then(|index| index.get(value.raw.as_str()))
                .copied();
        }
    }
}
