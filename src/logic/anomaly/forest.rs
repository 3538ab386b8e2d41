//! Isolation Forest
//!
//! Each tree is grown on `min(sample_size, n)` rows drawn without
//! replacement, up to a height limit of `ceil(log2(sample))`. A node picks a
//! feature uniformly among those that are not constant inside the node and
//! a split uniformly in `[min, max)`; rows with `x < split` go left. Nodes
//! with at most one row, no splittable feature, or at the height limit are
//! leaves.
//!
//! Path length of a point = depth of its leaf + c(leaf size), where
//! c(n) = 2 H(n - 1) - 2 (n - 1) / n is the average unsuccessful-search
//! length of a BST. Score s = 2^(-E[h] / c(sample)), in (0, 1]; higher is
//! more isolated.
//!
//! All randomness comes from one `StdRng` seeded with the caller's seed and
//! consumed in tree order, so the same seed and data give the same forest.

use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

#[derive(Debug, Clone)]
pub struct IsolationTree {
    root: Node,
}

impl IsolationTree {
    fn grow(data: &[Vec<f64>], rows: Vec<usize>, height_limit: usize, rng: &mut StdRng) -> Self {
        Self {
            root: grow_node(data, rows, 0, height_limit, rng),
        }
    }

    pub fn path_length(&self, point: &[f64]) -> f64 {
        let mut node = &self.root;
        let mut depth = 0usize;

        loop {
            match node {
                Node::Leaf { size } => return depth as f64 + average_path_length(*size),
                Node::Split { feature, threshold, left, right } => {
                    node = if point[*feature] < *threshold { left } else { right };
                    depth += 1;
                }
            }
        }
    }
}

fn grow_node(
    data: &[Vec<f64>],
    rows: Vec<usize>,
    depth: usize,
    height_limit: usize,
    rng: &mut StdRng,
) -> Node {
    if depth >= height_limit || rows.len() <= 1 {
        return Node::Leaf { size: rows.len() };
    }

    let n_features = data[rows[0]].len();
    let splittable: Vec<(usize, f64, f64)> = (0..n_features)
        .filter_map(|f| {
            let (lo, hi) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &r| {
                (lo.min(data[r][f]), hi.max(data[r][f]))
            });
            (lo < hi).then_some((f, lo, hi))
        })
        .collect();

    if splittable.is_empty() {
        return Node::Leaf { size: rows.len() };
    }

    let (feature, lo, hi) = splittable[rng.gen_range(0..splittable.len())];
    let threshold = split_between(lo, hi, rng.gen::<f64>());

    let (left_rows, right_rows): (Vec<usize>, Vec<usize>) =
        rows.into_iter().partition(|&r| data[r][feature] < threshold);

    Node::Split {
        feature,
        threshold,
        left: Box::new(grow_node(data, left_rows, depth + 1, height_limit, rng)),
        right: Box::new(grow_node(data, right_rows, depth + 1, height_limit, rng)),
    }
}

/// Point at fraction `u` of `[lo, hi]`, computed on halved bounds so the
/// span of two finite extremes never overflows to infinity.
fn split_between(lo: f64, hi: f64, u: f64) -> f64 {
    let half = lo / 2.0 + u * (hi / 2.0 - lo / 2.0);
    (half * 2.0).clamp(lo, hi)
}

/// c(n): average path length of an unsuccessful BST search over n items
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

#[derive(Debug, Clone)]
pub struct IsolationForest {
    trees: Vec<IsolationTree>,
    sample_size: usize,
}

impl IsolationForest {
    /// Fit on a dense matrix (rows x features). `data` must be non-empty.
    pub fn fit(data: &[Vec<f64>], n_trees: usize, sample_size: usize, seed: u64) -> Self {
        let n = data.len();
        let psi = sample_size.min(n).max(1);
        let height_limit = (psi as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(seed);

        let trees = (0..n_trees)
            .map(|_| {
                let rows = sample(&mut rng, n, psi).into_vec();
                IsolationTree::grow(data, rows, height_limit, &mut rng)
            })
            .collect();

        Self {
            trees,
            sample_size: psi,
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Mean path length across trees
    pub fn mean_path_length(&self, point: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        self.trees.iter().map(|t| t.path_length(point)).sum::<f64>() / self.trees.len() as f64
    }

    /// Isolation score in (0, 1]; 0.5 when the sample is too small to tell
    pub fn score(&self, point: &[f64]) -> f64 {
        let c = average_path_length(self.sample_size);
        if c <= 0.0 {
            return 0.5;
        }
        2f64.powf(-self.mean_path_length(point) / c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster_with_outlier() -> Vec<Vec<f64>> {
        let mut data: Vec<Vec<f64>> = (0..64)
            .map(|i| vec![10.0 + (i % 8) as f64 * 0.1, 5.0 + (i / 8) as f64 * 0.1])
            .collect();
        data.push(vec![100.0, -50.0]);
        data
    }

    #[test]
    fn test_average_path_length() {
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        let c256 = average_path_length(256);
        assert!(c256 > 10.0 && c256 < 11.0);
    }

    #[test]
    fn test_outlier_has_shorter_path() {
        let data = cluster_with_outlier();
        let forest = IsolationForest::fit(&data, 100, 256, 7);

        let outlier = forest.mean_path_length(&data[64]);
        let inlier = forest.mean_path_length(&data[20]);
        assert!(outlier < inlier);
        assert!(forest.score(&data[64]) > forest.score(&data[20]));
    }

    #[test]
    fn test_same_seed_same_scores() {
        let data = cluster_with_outlier();
        let a = IsolationForest::fit(&data, 50, 32, 42);
        let b = IsolationForest::fit(&data, 50, 32, 42);
        for row in &data {
            assert_eq!(a.score(row), b.score(row));
        }
    }

    #[test]
    fn test_split_between_extreme_bounds() {
        let t = split_between(-1e308, 1e308, 0.75);
        assert!(t.is_finite());
        assert!(t > 0.0 && t < 1e308);
        assert_eq!(split_between(-1e308, 1e308, 0.0), -1e308);
        assert_eq!(split_between(2.0, 4.0, 0.5), 3.0);
    }

    #[test]
    fn test_fit_on_extreme_magnitudes() {
        let mut data: Vec<Vec<f64>> = (0..32).map(|i| vec![i as f64]).collect();
        data.push(vec![1e308]);
        data.push(vec![-1e308]);
        let forest = IsolationForest::fit(&data, 25, 64, 3);
        let extreme = forest.score(&data[32]);
        assert!(extreme.is_finite());
        assert!(extreme > forest.score(&data[16]));
    }

    #[test]
    fn test_constant_data_scores_uniformly() {
        let data = vec![vec![1.0, 1.0]; 10];
        let forest = IsolationForest::fit(&data, 10, 256, 1);
        let s0 = forest.score(&data[0]);
        assert!(data.iter().all(|r| forest.score(r) == s0));
    }
}
