//! Random Forest Regressor
//!
//! Bagged CART trees; the prediction is the mean over trees. Each tree gets
//! its own `StdRng` seeded from the forest seed before any tree is grown, so
//! trees can be grown in parallel and still be reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::tree::{RegressionTree, TreeParams};
use crate::logic::config::RandomForestConfig;
use crate::logic::error::{AnalyticsError, AnalyticsResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    pub fn fit(x: &[Vec<f64>], y: &[f64], config: &RandomForestConfig, seed: u64) -> AnalyticsResult<Self> {
        let n = x.len();
        if n == 0 || y.len() != n {
            return Err(AnalyticsError::InsufficientData {
                required: 1,
                actual: n.min(y.len()),
            });
        }

        let params = TreeParams {
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            max_features: config.max_features,
        };

        let mut master = StdRng::seed_from_u64(seed);
        let tree_seeds: Vec<u64> = (0..config.n_trees.max(1)).map(|_| master.gen()).collect();

        let trees = tree_seeds
            .par_iter()
            .map(|&tree_seed| {
                let mut rng = StdRng::seed_from_u64(tree_seed);
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                RegressionTree::fit(x, y, bootstrap, params, &mut rng)
            })
            .collect();

        Ok(Self { trees })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn predict(&self, features: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        self.trees.iter().map(|t| t.predict(features)).sum::<f64>() / self.trees.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(n_trees: usize) -> RandomForestConfig {
        RandomForestConfig {
            n_trees,
            ..Default::default()
        }
    }

    #[test]
    fn test_fits_step_function() {
        let x: Vec<Vec<f64>> = (0..40).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..40).map(|i| if i < 20 { 0.0 } else { 10.0 }).collect();
        let forest = RandomForest::fit(&x, &y, &config(30), 42).unwrap();

        assert_eq!(forest.n_trees(), 30);
        assert!(forest.predict(&[5.0]) < 1.0);
        assert!(forest.predict(&[35.0]) > 9.0);
    }

    #[test]
    fn test_same_seed_same_forest() {
        let x: Vec<Vec<f64>> = (0..30).map(|i| vec![i as f64, (i % 4) as f64]).collect();
        let y: Vec<f64> = x.iter().map(|r| r[0] * 0.5 + r[1]).collect();
        let a = RandomForest::fit(&x, &y, &config(10), 9).unwrap();
        let b = RandomForest::fit(&x, &y, &config(10), 9).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_constant_target() {
        let x: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let forest = RandomForest::fit(&x, &[7.5; 10], &config(5), 1).unwrap();
        assert_eq!(forest.predict(&[3.0]), 7.5);
    }

    #[test]
    fn test_empty_input() {
        assert!(RandomForest::fit(&[], &[], &config(5), 1).is_err());
    }
}
