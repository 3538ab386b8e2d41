//! Record Filter - device and date-range selection
//!
//! Bounds are inclusive. Bound strings accept the same forms as timestamp
//! cells.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::SensorRecord;
use super::timestamp::parse_timestamp;
use crate::logic::error::{AnalyticsError, AnalyticsResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordFilter {
    pub device_id: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn device(mut self, device_id: &str) -> Self {
        self.device_id = Some(device_id.to_string());
        self
    }

    pub fn between(mut self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Build from optional query strings
    pub fn from_strings(
        device_id: Option<&str>,
        start: Option<&str>,
        end: Option<&str>,
    ) -> AnalyticsResult<Self> {
        let mut filter = Self::new().between(parse_bound("start_date", start)?, parse_bound("end_date", end)?);
        if let Some(device) = device_id {
            filter = filter.device(device);
        }
        Ok(filter)
    }

    pub fn matches(&self, record: &SensorRecord) -> bool {
        if let Some(device) = &self.device_id {
            if record.device_id != *device {
                return false;
            }
        }
        if let Some(start) = self.start {
            if record.timestamp < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if record.timestamp > end {
                return false;
            }
        }
        true
    }

    /// Keep matching records, preserving order
    pub fn apply(&self, records: Vec<SensorRecord>) -> Vec<SensorRecord> {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

fn parse_bound(name: &str, raw: Option<&str>) -> AnalyticsResult<Option<DateTime<Utc>>> {
    match raw {
        None => Ok(None),
        Some(s) => parse_timestamp(s).map(Some).ok_or_else(|| {
            AnalyticsError::InvalidFilter(format!(
                "Invalid {} format. Use YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS",
                name
            ))
        }),
    }
}
