//! Error handling

use thiserror::Error;

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

/// Dataset- and request-level failures.
///
/// Row-level problems (short rows, bad timestamps, unparsable cells) never
/// show up here; they are recovered where they happen.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("dataset is empty: no usable rows after normalization")]
    EmptyDataset,

    #[error("insufficient data: need at least {required} rows, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("no usable numeric feature columns")]
    NoUsableFeatures,

    #[error("model not found for target '{0}'")]
    UnknownTarget(String),

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    #[error(
        "feature layout mismatch: expected v{expected_version} ({expected_hash:08x}), \
         got v{actual_version} ({actual_hash:08x})"
    )]
    LayoutMismatch {
        expected_version: u8,
        expected_hash: u32,
        actual_version: u8,
        actual_hash: u32,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AnalyticsError {
    /// Short machine-readable kind, used in reports
    pub fn kind(&self) -> &'static str {
        match self {
            AnalyticsError::EmptyDataset => "empty_dataset",
            AnalyticsError::InsufficientData { .. } => "insufficient_data",
            AnalyticsError::NoUsableFeatures => "no_usable_features",
            AnalyticsError::UnknownTarget(_) => "unknown_target",
            AnalyticsError::UnknownColumn(_) => "unknown_column",
            AnalyticsError::InvalidConfig(_) => "invalid_config",
            AnalyticsError::InvalidFilter(_) => "invalid_filter",
            AnalyticsError::LayoutMismatch { .. } => "layout_mismatch",
            AnalyticsError::Io(_) => "io",
            AnalyticsError::Serialization(_) => "serialization",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_target_message() {
        let err = AnalyticsError::UnknownTarget("tempC".to_string());
        assert_eq!(err.to_string(), "model not found for target 'tempC'");
        assert_eq!(err.kind(), "unknown_target");
    }

    #[test]
    fn test_layout_mismatch_message() {
        let err = AnalyticsError::LayoutMismatch {
            expected_version: 1,
            expected_hash: 0xabc,
            actual_version: 1,
            actual_hash: 0xdef,
        };
        assert!(err.to_string().contains("00000abc"));
        assert!(err.to_string().contains("00000def"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: AnalyticsError = io.into();
        assert_eq!(err.kind(), "io");
    }
}
