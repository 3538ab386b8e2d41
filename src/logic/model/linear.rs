//! Linear Model
//!
//! Least squares with a tiny ridge term, solved from the normal equations
//! on centered features: (XᵀX + λI) β = Xᵀy, intercept = ȳ - β·x̄.

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::logic::error::{AnalyticsError, AnalyticsResult};

/// Keeps singular designs (constant or collinear columns) solvable
pub const RIDGE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearModel {
    pub fn fit(rows: &[Vec<f64>], targets: &[f64]) -> AnalyticsResult<Self> {
        let n = rows.len();
        if n == 0 || targets.len() != n {
            return Err(AnalyticsError::InsufficientData {
                required: 1,
                actual: n.min(targets.len()),
            });
        }
        let p = rows[0].len();

        let mut x = Array2::<f64>::zeros((n, p));
        for (i, row) in rows.iter().enumerate() {
            for (j, v) in row.iter().take(p).enumerate() {
                x[[i, j]] = *v;
            }
        }
        let y = Array1::from(targets.to_vec());

        let x_mean = x.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(p));
        let y_mean = y.mean().unwrap_or(0.0);
        let xc = &x - &x_mean;
        let yc = &y - y_mean;

        let mut gram = xc.t().dot(&xc);
        for j in 0..p {
            gram[[j, j]] += RIDGE;
        }
        let rhs = xc.t().dot(&yc);

        let beta = solve(gram, rhs);
        let intercept = y_mean - beta.dot(&x_mean);

        Ok(Self {
            coefficients: beta.to_vec(),
            intercept,
        })
    }

    pub fn predict(&self, features: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(b, x)| b * x)
                .sum::<f64>()
    }
}

/// Gaussian elimination with partial pivoting. A pivot that vanishes leaves
/// its coefficient at 0.
fn solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Array1<f64> {
    let p = b.len();

    for col in 0..p {
        let pivot = (col..p)
            .max_by(|&i, &j| a[[i, col]].abs().total_cmp(&a[[j, col]].abs()))
            .unwrap_or(col);
        if pivot != col {
            for k in 0..p {
                a.swap([col, k], [pivot, k]);
            }
            b.swap(col, pivot);
        }

        let diag = a[[col, col]];
        if diag.abs() < 1e-300 {
            continue;
        }
        for row in (col + 1)..p {
            let factor = a[[row, col]] / diag;
            if factor == 0.0 {
                continue;
            }
            for k in col..p {
                a[[row, k]] -= factor * a[[col, k]];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = Array1::<f64>::zeros(p);
    for row in (0..p).rev() {
        let diag = a[[row, row]];
        if diag.abs() < 1e-300 {
            continue;
        }
        let tail: f64 = ((row + 1)..p).map(|k| a[[row, k]] * x[k]).sum();
        x[row] = (b[row] - tail) / diag;
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovers_exact_plane() {
        // y = 3 + 2a - b
        let rows: Vec<Vec<f64>> = (0..20)
            .map(|i| vec![i as f64, ((i * 7) % 5) as f64])
            .collect();
        let y: Vec<f64> = rows.iter().map(|r| 3.0 + 2.0 * r[0] - r[1]).collect();

        let model = LinearModel::fit(&rows, &y).unwrap();
        assert!((model.coefficients[0] - 2.0).abs() < 1e-4);
        assert!((model.coefficients[1] + 1.0).abs() < 1e-4);
        assert!((model.predict(&[10.0, 1.0]) - 22.0).abs() < 1e-3);
    }

    #[test]
    fn test_constant_features_predict_mean() {
        let rows = vec![vec![1.0, 1.0]; 5];
        let y = vec![4.0, 6.0, 5.0, 5.0, 5.0];
        let model = LinearModel::fit(&rows, &y).unwrap();
        assert_eq!(model.coefficients, vec![0.0, 0.0]);
        assert!((model.predict(&[1.0, 1.0]) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_collinear_columns_are_solvable() {
        let rows: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64, 2.0 * i as f64]).collect();
        let y: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let model = LinearModel::fit(&rows, &y).unwrap();
        assert!((model.predict(&[4.0, 8.0]) - 4.0).abs() < 1e-3);
    }
}
