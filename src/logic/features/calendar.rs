//! Calendar features: pure functions of the timestamp.

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarFeatures {
    /// 0-23
    pub hour: u32,
    /// 0-6, Monday = 0
    pub day_of_week: u32,
    /// 1-366
    pub day_of_year: u32,
}

impl CalendarFeatures {
    pub fn from_timestamp(ts: &DateTime<Utc>) -> Self {
        Self {
            hour: ts.hour(),
            day_of_week: ts.weekday().num_days_from_monday(),
            day_of_year: ts.ordinal(),
        }
    }

    pub fn as_values(&self) -> [f64; 3] {
        [self.hour as f64, self.day_of_week as f64, self.day_of_year as f64]
    }
}
