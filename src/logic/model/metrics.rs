//! Held-out accuracy metrics

use serde::{Deserialize, Serialize};

/// Mean squared error. NaN when lengths differ or inputs are empty.
pub fn mse(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }

    let sum: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();

    sum / actual.len() as f64
}

/// Mean absolute error. NaN when lengths differ or inputs are empty.
pub fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }

    let sum: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum();

    sum / actual.len() as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub mse: f64,
    pub mae: f64,
    /// Rows the metrics were computed on
    pub samples: usize,
}

impl ModelMetrics {
    pub fn evaluate(actual: &[f64], predicted: &[f64]) -> Self {
        Self {
            mse: mse(actual, predicted),
            mae: mae(actual, predicted),
            samples: actual.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mse_mae() {
        let actual = [1.0, 2.0, 3.0, 4.0];
        let predicted = [1.0, 3.0, 1.0, 4.0];
        assert_eq!(mse(&actual, &predicted), 1.25);
        assert_eq!(mae(&actual, &predicted), 0.75);
    }

    #[test]
    fn test_mismatch_is_nan() {
        assert!(mse(&[1.0], &[]).is_nan());
        assert!(mae(&[], &[]).is_nan());
    }

    #[test]
    fn test_evaluate() {
        let m = ModelMetrics::evaluate(&[2.0, 2.0], &[2.0, 2.0]);
        assert_eq!(m.mse, 0.0);
        assert_eq!(m.samples, 2);
    }
}
