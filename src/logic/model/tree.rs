//! Regression Tree (CART)
//!
//! Greedy binary splits minimising the summed squared error of the two
//! children. Rows with `x <= threshold` go left; leaves predict the mean
//! target of their rows. Nodes live in a flat arena.

use std::cmp::Ordering;

use rand::rngs::StdRng;
use rand::seq::index::sample;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Features tried per split; `None` = all
    pub max_features: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
}

impl RegressionTree {
    /// Grow on the rows named by `rows` (duplicates allowed, as in a bootstrap)
    pub fn fit(x: &[Vec<f64>], y: &[f64], rows: Vec<usize>, params: TreeParams, rng: &mut StdRng) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(x, y, rows, 0, params, rng);
        tree
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn predict(&self, features: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes.get(idx) {
                Some(TreeNode::Leaf { value }) => return *value,
                Some(TreeNode::Split { feature, threshold, left, right }) => {
                    idx = if features[*feature] <= *threshold { *left } else { *right };
                }
                None => return 0.0,
            }
        }
    }

    fn grow(
        &mut self,
        x: &[Vec<f64>],
        y: &[f64],
        rows: Vec<usize>,
        depth: usize,
        params: TreeParams,
        rng: &mut StdRng,
    ) -> usize {
        let idx = self.nodes.len();
        let value = rows.iter().map(|&r| y[r]).sum::<f64>() / rows.len().max(1) as f64;
        self.nodes.push(TreeNode::Leaf { value });

        let depth_reached = params.max_depth.is_some_and(|d| depth >= d);
        if depth_reached || rows.len() < params.min_samples_split.max(2) {
            return idx;
        }

        let n_features = x[rows[0]].len();
        let features: Vec<usize> = match params.max_features {
            Some(m) if m < n_features => sample(rng, n_features, m.max(1)).into_vec(),
            _ => (0..n_features).collect(),
        };

        let Some((feature, threshold)) = best_split(x, y, &rows, &features) else {
            return idx;
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) =
            rows.into_iter().partition(|&r| x[r][feature] <= threshold);

        let left = self.grow(x, y, left_rows, depth + 1, params, rng);
        let right = self.grow(x, y, right_rows, depth + 1, params, rng);
        self.nodes[idx] = TreeNode::Split {
            feature,
            threshold,
            left,
            right,
        };
        idx
    }
}

/// Best (feature, threshold) by child SSE, if it beats the parent
fn best_split(x: &[Vec<f64>], y: &[f64], rows: &[usize], features: &[usize]) -> Option<(usize, f64)> {
    let n = rows.len() as f64;
    let total_sum: f64 = rows.iter().map(|&r| y[r]).sum();
    let total_sq: f64 = rows.iter().map(|&r| y[r] * y[r]).sum();
    let parent_sse = total_sq - total_sum * total_sum / n;
    if parent_sse <= 1e-12 {
        return None;
    }

    let mut best: Option<(usize, f64, f64)> = None;
    let mut sorted = rows.to_vec();

    for &f in features {
        sorted.sort_by(|&a, &b| x[a][f].partial_cmp(&x[b][f]).unwrap_or(Ordering::Equal));

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for i in 0..sorted.len() - 1 {
            let r = sorted[i];
            left_sum += y[r];
            left_sq += y[r] * y[r];

            let here = x[r][f];
            let next = x[sorted[i + 1]][f];
            if here == next {
                continue;
            }

            let left_n = (i + 1) as f64;
            let right_n = n - left_n;
            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;
            let sse = (left_sq - left_sum * left_sum / left_n) + (right_sq - right_sum * right_sum / right_n);

            if best.map_or(true, |(_, _, b)| sse < b) {
                best = Some((f, here / 2.0 + next / 2.0, sse));
            }
        }
    }

    best.filter(|(_, _, sse)| *sse < parent_sse - 1e-12)
        .map(|(f, t, _)| (f, t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn params() -> TreeParams {
        TreeParams {
            max_depth: None,
            min_samples_split: 2,
            max_features: None,
        }
    }

    #[test]
    fn test_step_function() {
        let x: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..10).map(|i| if i < 5 { 1.0 } else { 9.0 }).collect();
        let mut rng = StdRng::seed_from_u64(0);
        let tree = RegressionTree::fit(&x, &y, (0..10).collect(), params(), &mut rng);

        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.predict(&[2.0]), 1.0);
        assert_eq!(tree.predict(&[7.0]), 9.0);
        assert_eq!(tree.predict(&[4.5]), 1.0);
    }

    #[test]
    fn test_split_between_extremes_stays_finite() {
        let x = vec![vec![-1e308], vec![-1e308], vec![1e308], vec![1e308]];
        let y = vec![0.0, 0.0, 10.0, 10.0];
        let mut rng = StdRng::seed_from_u64(0);
        let tree = RegressionTree::fit(&x, &y, (0..4).collect(), params(), &mut rng);

        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.predict(&[-1e308]), 0.0);
        assert_eq!(tree.predict(&[1e308]), 10.0);
        assert_eq!(tree.predict(&[-1.0]), 0.0);
    }

    #[test]
    fn test_constant_target_is_single_leaf() {
        let x: Vec<Vec<f64>> = (0..6).map(|i| vec![i as f64, 1.0]).collect();
        let y = vec![3.0; 6];
        let mut rng = StdRng::seed_from_u64(0);
        let tree = RegressionTree::fit(&x, &y, (0..6).collect(), params(), &mut rng);
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.predict(&[100.0, -1.0]), 3.0);
    }

    #[test]
    fn test_max_depth_limits_growth() {
        let x: Vec<Vec<f64>> = (0..32).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..32).map(|i| (i * i) as f64).collect();
        let mut rng = StdRng::seed_from_u64(0);
        let shallow = TreeParams {
            max_depth: Some(2),
            ..params()
        };
        let tree = RegressionTree::fit(&x, &y, (0..32).collect(), shallow, &mut rng);
        assert!(tree.node_count() <= 7);
    }
}
