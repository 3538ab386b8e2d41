//! Central Configuration Constants
//!
//! Single source of truth for analytics defaults and the stock sensor table.
//! To change a default, only edit this file.

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Sensor Insight";

// ============================================
// Column names
// ============================================

/// Timestamp column in raw exports
pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// Device id column in raw exports
pub const DEVICE_COLUMN: &str = "deviceId";

// ============================================
// Stock sensor table
// ============================================

/// (logical name, raw column, unit, description, is_categorical)
pub const DEFAULT_SENSORS: &[(&str, &str, &str, &str, bool)] = &[
    ("temperature", "tempC", "°C", "Temperature in Celsius", false),
    ("humidity", "hum%", "%", "Relative humidity", false),
    ("co2", "co2_ppm", "ppm", "CO2 concentration", false),
    ("air_quality", "quality", "", "Air quality", true),
    ("light_raw", "ldr_raw", "", "Raw light sensor value", false),
    ("light_voltage", "ldr_v", "V", "Light sensor voltage", false),
    ("light_percentage", "ldr_pct", "%", "Light percentage", false),
    ("light_state", "light", "", "Light state (Dark/Bright)", true),
    ("mq135_raw", "mq135_raw", "", "MQ135 raw value", false),
    ("rs_r0", "rs_r0", "", "Sensor RS/R0 ratio", false),
];

/// Columns scored by the anomaly detector by default
pub const DEFAULT_ANOMALY_COLUMNS: &[&str] = &[
    "tempC", "hum%", "mq135_raw", "rs_r0", "co2_ppm", "ldr_raw", "ldr_v", "ldr_pct",
];

/// Columns forecast by default
pub const DEFAULT_TARGETS: &[&str] = &["tempC", "hum%", "co2_ppm", "ldr_raw"];

// ============================================
// Algorithm defaults
// ============================================

pub const DEFAULT_LAG_DEPTH: usize = 10;
pub const DEFAULT_WINDOW_SIZE: usize = 10;
pub const DEFAULT_CONTAMINATION: f64 = 0.1;
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_ISOLATION_TREES: usize = 100;
pub const DEFAULT_ISOLATION_SAMPLE: usize = 256;
pub const DEFAULT_FOREST_TREES: usize = 100;
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;
pub const DEFAULT_HORIZON: usize = 24;

/// Forecast step when none is configured (seconds)
pub const DEFAULT_STEP_SECONDS: i64 = 60;

// ============================================
// Environment overrides
// ============================================

pub const ENV_LAG_DEPTH: &str = "SENSOR_LAG_DEPTH";
pub const ENV_WINDOW_SIZE: &str = "SENSOR_WINDOW_SIZE";
pub const ENV_CONTAMINATION: &str = "SENSOR_CONTAMINATION";
pub const ENV_HORIZON: &str = "SENSOR_HORIZON";
pub const ENV_SEED: &str = "SENSOR_SEED";
pub const ENV_TARGETS: &str = "SENSOR_TARGETS";

/// Read and parse an environment variable, `None` when unset or invalid
pub fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

/// Read a comma separated list from the environment
pub fn env_list(key: &str) -> Option<Vec<String>> {
    let raw = std::env::var(key).ok()?;
    let items: Vec<String> = raw
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}
